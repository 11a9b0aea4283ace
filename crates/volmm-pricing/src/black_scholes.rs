//! Black-Scholes value and delta.
//!
//! Plain f64 math; exact-decimal precision buys nothing under a model with
//! an assumed volatility. Inputs are validated so degenerate parameters
//! surface as errors instead of NaN quotes.

use crate::error::{PricingError, Result};
use statrs::function::erf::erf;

fn validate(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> Result<()> {
    if !(s.is_finite() && k.is_finite() && t.is_finite() && r.is_finite() && sigma.is_finite()) {
        return Err(PricingError::Degenerate("non-finite input".to_string()));
    }
    if s <= 0.0 {
        return Err(PricingError::Degenerate(format!("stock value {s}")));
    }
    if k <= 0.0 {
        return Err(PricingError::Degenerate(format!("strike {k}")));
    }
    if t <= 0.0 {
        return Err(PricingError::Degenerate(format!("time to expiry {t}")));
    }
    if sigma <= 0.0 {
        return Err(PricingError::Degenerate(format!("volatility {sigma}")));
    }
    Ok(())
}

fn d1_d2(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> (f64, f64) {
    let vol_sqrt_t = sigma * t.sqrt();
    let d1 = ((s / k).ln() + (r + 0.5 * sigma * sigma) * t) / vol_sqrt_t;
    (d1, d1 - vol_sqrt_t)
}

fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

/// Black-Scholes call value.
pub fn call_value(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> Result<f64> {
    validate(s, k, t, r, sigma)?;
    let (d1, d2) = d1_d2(s, k, t, r, sigma);
    Ok(s * norm_cdf(d1) - k * (-r * t).exp() * norm_cdf(d2))
}

/// Black-Scholes put value.
pub fn put_value(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> Result<f64> {
    validate(s, k, t, r, sigma)?;
    let (d1, d2) = d1_d2(s, k, t, r, sigma);
    Ok(k * (-r * t).exp() * norm_cdf(-d2) - s * norm_cdf(-d1))
}

/// Black-Scholes call delta: N(d1), in (0, 1).
pub fn call_delta(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> Result<f64> {
    validate(s, k, t, r, sigma)?;
    let (d1, _) = d1_d2(s, k, t, r, sigma);
    Ok(norm_cdf(d1))
}

/// Black-Scholes put delta: N(d1) - 1, in (-1, 0).
pub fn put_delta(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> Result<f64> {
    Ok(call_delta(s, k, t, r, sigma)? - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atm_call_value() {
        // S=100, K=100, T=1, r=0, sigma=0.2: d1=0.1, d2=-0.1,
        // C = 100*(N(0.1) - N(-0.1)) ~= 7.966
        let c = call_value(100.0, 100.0, 1.0, 0.0, 0.2).unwrap();
        assert!((c - 7.9656).abs() < 1e-2, "got {c}");
    }

    #[test]
    fn test_put_call_parity() {
        let (s, k, t, r, sigma) = (100.0, 95.0, 0.5, 0.05, 0.3);
        let c = call_value(s, k, t, r, sigma).unwrap();
        let p = put_value(s, k, t, r, sigma).unwrap();
        let forward = s - k * (-r * t).exp();
        assert!((c - p - forward).abs() < 1e-6);
    }

    #[test]
    fn test_deep_itm_call_approaches_intrinsic() {
        let c = call_value(100.0, 1.0, 0.1, 0.0, 0.2).unwrap();
        assert!((c - 99.0).abs() < 1e-6);
        let d = call_delta(100.0, 1.0, 0.1, 0.0, 0.2).unwrap();
        assert!(d > 0.999);
    }

    #[test]
    fn test_delta_bounds_and_relation() {
        let cd = call_delta(100.0, 110.0, 0.25, 0.03, 0.4).unwrap();
        let pd = put_delta(100.0, 110.0, 0.25, 0.03, 0.4).unwrap();
        assert!(cd > 0.0 && cd < 1.0);
        assert!(pd > -1.0 && pd < 0.0);
        assert!((cd - pd - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_inputs_are_errors() {
        assert!(call_value(100.0, 100.0, 0.0, 0.0, 0.2).is_err());
        assert!(call_value(100.0, 100.0, 1.0, 0.0, 0.0).is_err());
        assert!(call_value(0.0, 100.0, 1.0, 0.0, 0.2).is_err());
        assert!(put_value(100.0, 100.0, f64::NAN, 0.0, 0.2).is_err());
    }
}
