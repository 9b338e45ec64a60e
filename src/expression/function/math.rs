//! Mathematical functions.

use crate::data::{ExprType, ExprValue};
use crate::error::{QueryError, QueryResult};
use crate::expression::function::{operators, FunctionRepository};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use ExprType::{Double, Float, Integer, Long};

pub(super) fn register(repository: &mut FunctionRepository) {
    for ty in [Integer, Long, Float, Double] {
        repository.register_scalar("abs", vec![ty], ty, abs);
        repository.register_scalar("mod", vec![ty, ty], ty, operators::modulus);
    }

    repository.register_scalar("ceil", vec![Double], Long, ceil);
    repository.register_scalar("ceiling", vec![Double], Long, ceil);
    repository.register_scalar("floor", vec![Double], Long, floor);

    repository.register_scalar("round", vec![Long], Long, round);
    repository.register_scalar("round", vec![Double], Double, round);
    repository.register_scalar("round", vec![Long, Integer], Long, round);
    repository.register_scalar("round", vec![Double, Integer], Double, round);

    repository.register_scalar("sqrt", vec![Double], Double, sqrt);
    repository.register_scalar("cbrt", vec![Double], Double, |args| {
        Ok(ExprValue::Double(args[0].double_value()?.cbrt()))
    });
    repository.register_scalar("pow", vec![Double, Double], Double, pow);
    repository.register_scalar("power", vec![Double, Double], Double, pow);
    repository.register_scalar("exp", vec![Double], Double, |args| {
        Ok(ExprValue::Double(args[0].double_value()?.exp()))
    });
    repository.register_scalar("ln", vec![Double], Double, ln);
    repository.register_scalar("log10", vec![Double], Double, log10);
    repository.register_scalar("sign", vec![Double], Integer, sign);
    repository.register_scalar("pi", vec![], Double, |_| Ok(ExprValue::Double(std::f64::consts::PI)));
    repository.register_scalar("e", vec![], Double, |_| Ok(ExprValue::Double(std::f64::consts::E)));
    repository.register_scalar("rand", vec![Integer], Double, rand);
}

fn abs(args: &[ExprValue]) -> QueryResult<ExprValue> {
    match &args[0] {
        ExprValue::Integer(v) => Ok(ExprValue::Integer(v.wrapping_abs())),
        ExprValue::Long(v) => Ok(ExprValue::Long(v.wrapping_abs())),
        ExprValue::Float(v) => Ok(ExprValue::Float(v.abs())),
        ExprValue::Double(v) => Ok(ExprValue::Double(v.abs())),
        other => Err(QueryError::evaluation(format!(
            "unexpected type [{}] in abs",
            other.expr_type()
        ))),
    }
}

fn ceil(args: &[ExprValue]) -> QueryResult<ExprValue> {
    Ok(ExprValue::Long(args[0].double_value()?.ceil() as i64))
}

fn floor(args: &[ExprValue]) -> QueryResult<ExprValue> {
    Ok(ExprValue::Long(args[0].double_value()?.floor() as i64))
}

/// Round half away from zero to the given number of decimal places.
fn round(args: &[ExprValue]) -> QueryResult<ExprValue> {
    let places = match args.get(1) {
        Some(places) => places.integer_value()?,
        None => 0,
    };
    let scale = 10f64.powi(places);
    match &args[0] {
        ExprValue::Long(v) if places >= 0 => Ok(ExprValue::Long(*v)),
        ExprValue::Long(v) => Ok(ExprValue::Long(((*v as f64 * scale).round() / scale) as i64)),
        other => Ok(ExprValue::Double(
            (other.double_value()? * scale).round() / scale,
        )),
    }
}

// Negative input has no real root.
fn sqrt(args: &[ExprValue]) -> QueryResult<ExprValue> {
    let value = args[0].double_value()?;
    if value < 0.0 {
        Ok(ExprValue::Null)
    } else {
        Ok(ExprValue::Double(value.sqrt()))
    }
}

fn pow(args: &[ExprValue]) -> QueryResult<ExprValue> {
    let result = args[0].double_value()?.powf(args[1].double_value()?);
    if result.is_nan() {
        Ok(ExprValue::Null)
    } else {
        Ok(ExprValue::Double(result))
    }
}

fn ln(args: &[ExprValue]) -> QueryResult<ExprValue> {
    let value = args[0].double_value()?;
    if value <= 0.0 {
        Ok(ExprValue::Null)
    } else {
        Ok(ExprValue::Double(value.ln()))
    }
}

fn log10(args: &[ExprValue]) -> QueryResult<ExprValue> {
    let value = args[0].double_value()?;
    if value <= 0.0 {
        Ok(ExprValue::Null)
    } else {
        Ok(ExprValue::Double(value.log10()))
    }
}

fn sign(args: &[ExprValue]) -> QueryResult<ExprValue> {
    let value = args[0].double_value()?;
    let sign = if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    };
    Ok(ExprValue::Integer(sign))
}

/// Seeded pseudo random number in `[0, 1)`. The same seed always gives the
/// same value.
fn rand(args: &[ExprValue]) -> QueryResult<ExprValue> {
    let seed = args[0].long_value()? as u64;
    let mut rng = StdRng::seed_from_u64(seed);
    Ok(ExprValue::Double(rng.gen::<f64>()))
}
