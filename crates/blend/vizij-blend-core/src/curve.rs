//! Packed blend-shaping curves.
//!
//! A [`BlendCurve`] holds up to four interior Hermite keys. The endpoints are
//! implicit: in the from-weight view they are `(t=0, v=1, out=-1)` and
//! `(t=1, v=0, in=-1)`. Stored keys use the to-weight view (value rises from
//! 0 to 1), which is the from-weight view with the value axis inverted and the
//! tangents negated. [`pack`] performs that inversion when converting an
//! [`AuthoredCurve`], which is written in the host tool's from-weight view.
//!
//! An empty curve is the linear fast path: evaluation is a clamp.

use serde::{Deserialize, Serialize};

use crate::error::BuildError;
use crate::interp::functions::{hermite_segment, saturate};

/// Maximum number of interior keys a packed curve can hold.
pub const MAX_CURVE_KEYS: usize = 4;

/// Tolerance used when recognising the default linear authored curve.
pub const LINEAR_MATCH_EPSILON: f32 = 0.001;

/// One interior control point of a blend-shaping spline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CurveKeyframe {
    pub time: f32,
    pub value: f32,
    pub in_tangent: f32,
    pub out_tangent: f32,
}

impl CurveKeyframe {
    pub const fn new(time: f32, value: f32, in_tangent: f32, out_tangent: f32) -> Self {
        Self {
            time,
            value,
            in_tangent,
            out_tangent,
        }
    }

    /// The same point seen from the opposite weight convention.
    #[inline]
    fn inverted(self) -> Self {
        Self {
            time: self.time,
            value: 1.0 - self.value,
            in_tangent: -self.in_tangent,
            out_tangent: -self.out_tangent,
        }
    }
}

/// Implicit start point, from-weight view.
const FROM_START: CurveKeyframe = CurveKeyframe::new(0.0, 1.0, -1.0, -1.0);
/// Implicit end point, from-weight view.
const FROM_END: CurveKeyframe = CurveKeyframe::new(1.0, 0.0, -1.0, -1.0);
/// Implicit start point, to-weight view.
const TO_START: CurveKeyframe = CurveKeyframe::new(0.0, 0.0, 1.0, 1.0);
/// Implicit end point, to-weight view.
const TO_END: CurveKeyframe = CurveKeyframe::new(1.0, 1.0, 1.0, 1.0);

/// Packed, immutable blend curve. `Copy`, so it can be handed to any number
/// of worker threads by value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BlendCurve {
    keys: [CurveKeyframe; MAX_CURVE_KEYS],
    count: u8,
}

impl BlendCurve {
    /// The linear fast path (no keys).
    pub const LINEAR: BlendCurve = BlendCurve {
        keys: [CurveKeyframe::new(0.0, 0.0, 0.0, 0.0); MAX_CURVE_KEYS],
        count: 0,
    };

    /// Build from to-weight keys. Keys past [`MAX_CURVE_KEYS`] are dropped;
    /// callers are expected to pass increasing times inside (0, 1).
    pub fn from_keys(keys: &[CurveKeyframe]) -> Self {
        let mut out = Self::LINEAR;
        let n = keys.len().min(MAX_CURVE_KEYS);
        out.keys[..n].copy_from_slice(&keys[..n]);
        out.count = n as u8;
        out
    }

    /// Stored (to-weight) keys.
    #[inline]
    pub fn keys(&self) -> &[CurveKeyframe] {
        let n = (self.count as usize).min(MAX_CURVE_KEYS);
        &self.keys[..n]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when evaluation takes the linear fast path.
    #[inline]
    pub fn is_linear(&self) -> bool {
        self.is_empty()
    }

    /// Implicit endpoints plus stored keys, to-weight view.
    fn to_weight_points(&self) -> ([CurveKeyframe; MAX_CURVE_KEYS + 2], usize) {
        let keys = self.keys();
        let mut pts = [TO_START; MAX_CURVE_KEYS + 2];
        pts[1..=keys.len()].copy_from_slice(keys);
        pts[keys.len() + 1] = TO_END;
        (pts, keys.len() + 2)
    }

    /// Implicit endpoints plus stored keys, from-weight view.
    fn from_weight_points(&self) -> ([CurveKeyframe; MAX_CURVE_KEYS + 2], usize) {
        let keys = self.keys();
        let mut pts = [FROM_START; MAX_CURVE_KEYS + 2];
        for (dst, k) in pts[1..].iter_mut().zip(keys) {
            *dst = k.inverted();
        }
        pts[keys.len() + 1] = FROM_END;
        (pts, keys.len() + 2)
    }
}

/// Locate the segment `[points[i], points[i + 1]]` containing `t` by linear scan.
/// At or past the last key the final segment (`len - 2`) is returned.
#[inline]
pub fn find_segment(points: &[CurveKeyframe], t: f32) -> usize {
    let last = points.len().saturating_sub(1);
    for i in 0..last {
        if t >= points[i].time && t < points[i + 1].time {
            return i;
        }
    }
    last.saturating_sub(1)
}

#[inline]
fn eval_points(points: &[CurveKeyframe], t: f32) -> f32 {
    let i = find_segment(points, t);
    let k0 = points[i];
    let k1 = points[i + 1];
    hermite_segment(
        k0.time,
        k0.value,
        k0.out_tangent,
        k1.time,
        k1.value,
        k1.in_tangent,
        t,
    )
}

/// Evaluate the curve at normalized time `t`, returning the to-weight in [0, 1].
///
/// An empty curve returns `saturate(t)`.
#[inline]
pub fn evaluate(curve: &BlendCurve, t: f32) -> f32 {
    let t = saturate(t);
    if curve.is_linear() {
        return t;
    }
    let (pts, n) = curve.to_weight_points();
    saturate(eval_points(&pts[..n], t))
}

/// Transition-weight evaluation: walks the curve in the from-weight view and
/// returns `1 - from_weight`, so progress 0 is fully "from" and 1 fully "to".
///
/// This is the form used by the transition state calculator on every call
/// site. It agrees with [`evaluate`] up to float rounding.
#[inline]
pub fn evaluate_blend_curve(curve: &BlendCurve, progress: f32) -> f32 {
    let t = saturate(progress);
    if curve.is_linear() {
        return t;
    }
    let (pts, n) = curve.from_weight_points();
    let from_weight = saturate(eval_points(&pts[..n], t));
    1.0 - from_weight
}

/// One key of a curve as authored in the host animation tool
/// (from-weight view: value falls from 1 to 0).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthoredKey {
    pub time: f32,
    pub value: f32,
    #[serde(default, rename = "inTangent", alias = "in_tangent")]
    pub in_tangent: f32,
    #[serde(default, rename = "outTangent", alias = "out_tangent")]
    pub out_tangent: f32,
}

impl AuthoredKey {
    pub const fn new(time: f32, value: f32, in_tangent: f32, out_tangent: f32) -> Self {
        Self {
            time,
            value,
            in_tangent,
            out_tangent,
        }
    }
}

/// Externally authored blend curve.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthoredCurve {
    pub keys: Vec<AuthoredKey>,
}

impl AuthoredCurve {
    pub fn new(keys: Vec<AuthoredKey>) -> Self {
        Self { keys }
    }

    /// The host tool's default linear transition curve.
    pub fn linear() -> Self {
        Self::new(vec![
            AuthoredKey::new(0.0, 1.0, 0.0, -1.0),
            AuthoredKey::new(1.0, 0.0, -1.0, 0.0),
        ])
    }

    /// True when this is the default two-key linear curve within [`LINEAR_MATCH_EPSILON`].
    pub fn is_default_linear(&self) -> bool {
        let close = |a: f32, b: f32| (a - b).abs() < LINEAR_MATCH_EPSILON;
        match self.keys.as_slice() {
            [a, b] => {
                close(a.time, 0.0)
                    && close(a.value, 1.0)
                    && close(a.out_tangent, -1.0)
                    && close(b.time, 1.0)
                    && close(b.value, 0.0)
                    && close(b.in_tangent, -1.0)
            }
            _ => false,
        }
    }

    /// Sample the authored curve (from-weight view). Holds the first/last
    /// value outside the key range; an empty curve is linear.
    pub fn sample(&self, t: f32) -> f32 {
        let keys = &self.keys;
        match keys.len() {
            0 => 1.0 - saturate(t),
            1 => keys[0].value,
            n => {
                if t <= keys[0].time {
                    return keys[0].value;
                }
                if t >= keys[n - 1].time {
                    return keys[n - 1].value;
                }
                let i = keys
                    .windows(2)
                    .position(|w| t >= w[0].time && t < w[1].time)
                    .unwrap_or(n - 2);
                let (k0, k1) = (keys[i], keys[i + 1]);
                hermite_segment(
                    k0.time,
                    k0.value,
                    k0.out_tangent,
                    k1.time,
                    k1.value,
                    k1.in_tangent,
                    t,
                )
            }
        }
    }
}

/// Parse an authored curve from JSON (`{ "keys": [{ "time", "value", "inTangent", "outTangent" }] }`).
pub fn parse_authored_curve_json(s: &str) -> Result<AuthoredCurve, BuildError> {
    let mut curve: AuthoredCurve = serde_json::from_str(s)?;
    curve
        .keys
        .sort_by(|a, b| a.time.partial_cmp(&b.time).unwrap_or(std::cmp::Ordering::Equal));
    Ok(curve)
}

/// Convert an authored curve into packed form.
///
/// Returns `None` for the default linear curve (and for an empty curve): the
/// caller should use [`BlendCurve::LINEAR`]. Interior keys (times strictly
/// inside (0, 1)) are inverted into the to-weight view. A non-default curve
/// without interior keys gets one key sampled at t = 0.5 so its shape is kept.
pub fn pack(authored: &AuthoredCurve) -> Option<BlendCurve> {
    if authored.keys.is_empty() || authored.is_default_linear() {
        return None;
    }

    let mut interior: Vec<CurveKeyframe> = authored
        .keys
        .iter()
        .filter(|k| k.time > 0.0 && k.time < 1.0)
        .map(|k| CurveKeyframe::new(k.time, k.value, k.in_tangent, k.out_tangent).inverted())
        .collect();
    interior.sort_by(|a, b| a.time.partial_cmp(&b.time).unwrap_or(std::cmp::Ordering::Equal));

    if interior.len() > MAX_CURVE_KEYS {
        log::warn!(
            "blend curve has {} interior keys; keeping the first {}",
            interior.len(),
            MAX_CURVE_KEYS
        );
        interior.truncate(MAX_CURVE_KEYS);
    }

    if interior.is_empty() {
        const MID: f32 = 0.5;
        const H: f32 = 1e-3;
        let value = authored.sample(MID);
        let slope = (authored.sample(MID + H) - authored.sample(MID - H)) / (2.0 * H);
        interior.push(CurveKeyframe::new(MID, value, slope, slope).inverted());
    }

    Some(BlendCurve::from_keys(&interior))
}

/// [`pack`], falling back to [`BlendCurve::LINEAR`].
#[inline]
pub fn pack_or_linear(authored: Option<&AuthoredCurve>) -> BlendCurve {
    authored.and_then(pack).unwrap_or(BlendCurve::LINEAR)
}
