use js_sys::JSON;
use serde::Serialize;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use vizij_blend_core::{
    calculate_state as core_calculate_state,
    calculate_state_from_progress as core_calculate_state_from_progress,
    calculate_timing as core_calculate_timing, compute_weights,
    evaluate_blend_curve as core_evaluate_blend_curve, flatten, pack, pack_or_linear,
    parse_state_machine_json, AuthoredCurve, Blend2DAlgorithm, Config, TransitionPreview,
    TransitionRequest, TransitionTimingInput,
};

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

/// Serialize maps as plain objects so results can be JSON.stringify'd.
fn to_js<T: Serialize>(value: &T, what: &str) -> Result<JsValue, JsError> {
    value
        .serialize(&swb::Serializer::json_compatible())
        .map_err(|e| JsError::new(&format!("{what} error: {e}")))
}

fn parse_request(request: JsValue) -> Result<TransitionRequest, JsError> {
    if jsvalue_is_undefined_or_null(&request) {
        return Err(JsError::new("transition request is null/undefined"));
    }
    swb::from_value(request).map_err(|e| JsError::new(&format!("transition request error: {e}")))
}

fn parse_config(config: JsValue) -> Result<Config, JsError> {
    if jsvalue_is_undefined_or_null(&config) {
        Ok(Config::default())
    } else {
        swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))
    }
}

/// Interactive scrub session over a single transition.
#[wasm_bindgen]
pub struct VizijBlendPreview {
    preview: TransitionPreview,
}

#[wasm_bindgen]
impl VizijBlendPreview {
    /// Create a preview from a transition request and an optional config.
    /// Example:
    ///   new VizijBlendPreview({ from_state_duration: 1, to_state_duration: 0.8,
    ///     requested_exit_time: 0.75, requested_transition_duration: 0.25 }, { preview_loop: true })
    #[wasm_bindgen(constructor)]
    pub fn new(request: JsValue, config: JsValue) -> Result<VizijBlendPreview, JsError> {
        console_error_panic_hook::set_once();
        let request = parse_request(request)?;
        let cfg = parse_config(config)?;
        Ok(VizijBlendPreview {
            preview: TransitionPreview::from_request(request, cfg),
        })
    }

    /// Jump to a normalized timeline position and return the snapshot.
    pub fn scrub(&mut self, normalized_time: f32) -> Result<JsValue, JsError> {
        to_js(&self.preview.scrub(normalized_time), "snapshot")
    }

    #[wasm_bindgen(js_name = set_progress)]
    pub fn set_progress(&mut self, progress: f32) -> Result<JsValue, JsError> {
        to_js(&self.preview.set_progress(progress), "snapshot")
    }

    /// Play forward by `dt` seconds.
    pub fn advance(&mut self, dt: f32) -> Result<JsValue, JsError> {
        to_js(&self.preview.advance(dt), "snapshot")
    }

    pub fn snapshot(&self) -> Result<JsValue, JsError> {
        to_js(&self.preview.snapshot(), "snapshot")
    }

    pub fn timing(&self) -> Result<JsValue, JsError> {
        to_js(self.preview.timing(), "timing")
    }

    /// Current normalized timeline position.
    pub fn position(&self) -> f32 {
        self.preview.position()
    }
}

/// Lay out a transition timeline from a `TransitionTimingInput` object.
#[wasm_bindgen]
pub fn calculate_timing(input: JsValue) -> Result<JsValue, JsError> {
    let input: TransitionTimingInput =
        swb::from_value(input).map_err(|e| JsError::new(&format!("timing input error: {e}")))?;
    to_js(&core_calculate_timing(&input), "timing")
}

/// Evaluate a transition request at a normalized timeline position.
#[wasm_bindgen]
pub fn calculate_state(request: JsValue, normalized_time: f32) -> Result<JsValue, JsError> {
    let cfg = parse_request(request)?.into_config(&Config::default());
    to_js(&core_calculate_state(&cfg, normalized_time), "snapshot")
}

/// Evaluate a transition request at a transition-only progress value.
#[wasm_bindgen]
pub fn calculate_state_from_progress(request: JsValue, progress: f32) -> Result<JsValue, JsError> {
    let cfg = parse_request(request)?.into_config(&Config::default());
    to_js(&core_calculate_state_from_progress(&cfg, progress), "snapshot")
}

/// Blend-space weights. `algorithm` is `"simple_directional"` or
/// `"inverse_distance_weighting"` (undefined selects the former);
/// `positions` is an array of `[x, y]` pairs.
#[wasm_bindgen]
pub fn blend_weights(
    algorithm: JsValue,
    x: f32,
    y: f32,
    positions: JsValue,
) -> Result<Vec<f32>, JsError> {
    let algorithm: Blend2DAlgorithm = if jsvalue_is_undefined_or_null(&algorithm) {
        Blend2DAlgorithm::default()
    } else {
        swb::from_value(algorithm).map_err(|e| JsError::new(&format!("algorithm error: {e}")))?
    };
    let positions: Vec<[f32; 2]> =
        swb::from_value(positions).map_err(|e| JsError::new(&format!("positions error: {e}")))?;
    Ok(compute_weights(algorithm, [x, y], &positions))
}

/// Pack an authored curve. Returns null for the default linear curve.
#[wasm_bindgen(js_name = pack_curve)]
pub fn pack_curve(curve: JsValue) -> Result<JsValue, JsError> {
    let curve: AuthoredCurve =
        swb::from_value(curve).map_err(|e| JsError::new(&format!("curve error: {e}")))?;
    match pack(&curve) {
        Some(packed) => to_js(&packed, "curve"),
        None => Ok(JsValue::NULL),
    }
}

/// "To" weight of an authored curve (null/undefined = linear) at `progress`.
#[wasm_bindgen]
pub fn evaluate_blend_curve(curve: JsValue, progress: f32) -> Result<f32, JsError> {
    let authored: Option<AuthoredCurve> = if jsvalue_is_undefined_or_null(&curve) {
        None
    } else {
        Some(swb::from_value(curve).map_err(|e| JsError::new(&format!("curve error: {e}")))?)
    };
    let packed = pack_or_linear(authored.as_ref());
    Ok(core_evaluate_blend_curve(&packed, progress))
}

/// Flatten a state-machine definition object into its runtime form.
#[wasm_bindgen(js_name = flatten_state_machine)]
pub fn flatten_state_machine(definition: JsValue) -> Result<JsValue, JsError> {
    if jsvalue_is_undefined_or_null(&definition) {
        return Err(JsError::new(
            "flatten_state_machine: definition is null/undefined",
        ));
    }
    // Stringify so the core JSON parser (and its error reporting) is reused.
    let s = JSON::stringify(&definition)
        .map_err(|e| JsError::new(&format!("flatten_state_machine stringify error: {:?}", e)))?
        .as_string()
        .ok_or_else(|| JsError::new("flatten_state_machine: stringify produced non-string"))?;
    let def = parse_state_machine_json(&s).map_err(|e| {
        JsError::new(&format!("flatten_state_machine {} error: {e}", e.category()))
    })?;
    let flat = flatten(&def).map_err(|e| {
        JsError::new(&format!("flatten_state_machine {} error: {e}", e.category()))
    })?;
    to_js(&flat, "flattened machine")
}

/// Numeric ABI version, checked by the JS wrapper at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
