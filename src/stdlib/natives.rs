//! The built-in natives and dynamic functions.

use std::rc::Rc;

use num_bigint::BigInt;
use num_traits::{FromPrimitive, Signed, ToPrimitive};
use rand::Rng;
use regex::Regex;

use crate::{
    ast::types::Type,
    evaluator::value::{Material, Value},
};

use super::{context::RunContext, function::Function, stdlib::StandardLibrary};

pub fn register_all(stdlib: &mut StandardLibrary) {
    register_basic(stdlib);
    register_math(stdlib);
    register_casts(stdlib);
    register_strings(stdlib);
    register_randomness(stdlib);
    register_collections(stdlib);
}

fn to_i64(value: &BigInt) -> Result<i64, String> {
    value
        .to_i64()
        .ok_or_else(|| format!("{} is out of range", value))
}

fn real_to_number(value: f64) -> Result<BigInt, String> {
    BigInt::from_f64(value).ok_or_else(|| format!("{:?} cannot be converted to a number", value))
}

// Basic

fn print_resolver(types: &[Type]) -> Option<Function> {
    if types.len() != 1 || types[0].is_pseudo() {
        return None;
    }

    Some(Function::native(
        "print",
        types.to_vec(),
        vec![String::from("value")],
        None,
        Rc::new(|context: &mut RunContext, arguments: Vec<Value>| {
            let message: Vec<String> = arguments.iter().map(Value::to_string).collect();
            context.output.println(&message.join(" "));
            Ok(Value::Unit)
        }),
    ))
}

fn move_direction(context: &mut RunContext, direction: String) -> Result<(), String> {
    match direction.as_str() {
        "posx" => context.move_cursor(1, 0, 0),
        "negx" => context.move_cursor(-1, 0, 0),
        "posy" => context.move_cursor(0, 1, 0),
        "negy" => context.move_cursor(0, -1, 0),
        "posz" => context.move_cursor(0, 0, 1),
        "negz" => context.move_cursor(0, 0, -1),
        other => return Err(format!("invalid move direction {:?}", other)),
    }
    Ok(())
}

fn move_by(context: &mut RunContext, x: BigInt, y: BigInt, z: BigInt) -> Result<(), String> {
    context.move_cursor(to_i64(&x)?, to_i64(&y)?, to_i64(&z)?);
    Ok(())
}

fn move_vector(context: &mut RunContext, vector: Vec<BigInt>) -> Result<(), String> {
    match vector.as_slice() {
        [x, y, z] => {
            context.move_cursor(to_i64(x)?, to_i64(y)?, to_i64(z)?);
            Ok(())
        }
        _ => Err(format!("expected a vector of 3 numbers, received {}", vector.len())),
    }
}

fn position(context: &mut RunContext) -> Vec<BigInt> {
    let cursor = context.cursor;
    vec![BigInt::from(cursor.x), BigInt::from(cursor.y), BigInt::from(cursor.z)]
}

fn args(context: &mut RunContext) -> String {
    context.args.clone()
}

fn register_basic(stdlib: &mut StandardLibrary) {
    stdlib.register_dynamic("print", print_resolver);
    stdlib.register_native(
        "native move(direction: <posx, negx, posy, negy, posz, negz>);",
        move_direction,
    );
    stdlib.register_native("native move(x: number, y: number, z: number);", move_by);
    stdlib.register_native("native move(vector: [number]);", move_vector);
    stdlib.register_native("native position(): [number];", position);
    stdlib.register_native("native args(): string;", args);
}

// Math

fn register_math(stdlib: &mut StandardLibrary) {
    stdlib.register_native("native sqrt(value: real): real;", |_: &mut RunContext, value: f64| value.sqrt());
    stdlib.register_native("native sqrt(value: number): real;", |_: &mut RunContext, value: BigInt| {
        value.to_f64().unwrap_or(f64::NAN).sqrt()
    });
    stdlib.register_native("native abs(value: real): real;", |_: &mut RunContext, value: f64| value.abs());
    stdlib.register_native("native abs(value: number): number;", |_: &mut RunContext, value: BigInt| value.abs());
    stdlib.register_native("native floor(value: real): number;", |_: &mut RunContext, value: f64| {
        real_to_number(value.floor())
    });
    stdlib.register_native("native ceil(value: real): number;", |_: &mut RunContext, value: f64| {
        real_to_number(value.ceil())
    });
    stdlib.register_native("native round(value: real): number;", |_: &mut RunContext, value: f64| {
        real_to_number(value.round())
    });
    stdlib.register_native("native sin(value: real): real;", |_: &mut RunContext, value: f64| value.sin());
    stdlib.register_native("native cos(value: real): real;", |_: &mut RunContext, value: f64| value.cos());
    stdlib.register_native("native tan(value: real): real;", |_: &mut RunContext, value: f64| value.tan());
    stdlib.register_native(
        "native log(base: real, value: real): real;",
        |_: &mut RunContext, base: f64, value: f64| value.ln() / base.ln(),
    );
    stdlib.register_native(
        "native log(base: number, value: number): real;",
        |_: &mut RunContext, base: BigInt, value: BigInt| {
            let base = base.to_f64().unwrap_or(f64::NAN);
            let value = value.to_f64().unwrap_or(f64::NAN);
            value.ln() / base.ln()
        },
    );
    stdlib.register_native("native sign(value: real): number;", |_: &mut RunContext, value: f64| {
        if value > 0.0 {
            BigInt::from(1)
        } else if value < 0.0 {
            BigInt::from(-1)
        } else {
            BigInt::from(0)
        }
    });
    stdlib.register_native("native sign(value: number): number;", |_: &mut RunContext, value: BigInt| {
        value.signum()
    });
    stdlib.register_native("native to_radians(degrees: real): real;", |_: &mut RunContext, value: f64| {
        value.to_radians()
    });
    stdlib.register_native("native to_degrees(radians: real): real;", |_: &mut RunContext, value: f64| {
        value.to_degrees()
    });
}

// Casts

fn register_casts(stdlib: &mut StandardLibrary) {
    stdlib.register_native("native as_real(value: number): real;", |_: &mut RunContext, value: BigInt| {
        value.to_f64().ok_or_else(|| format!("{} does not fit in a real", value))
    });
    stdlib.register_native("native as_real(value: string): real;", |_: &mut RunContext, value: String| {
        value
            .replace('_', "")
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("{:?} is not a real", value))
    });
    stdlib.register_native("native as_number(value: real): number;", |_: &mut RunContext, value: f64| {
        real_to_number(value.trunc())
    });
    stdlib.register_native("native as_number(value: string): number;", |_: &mut RunContext, value: String| {
        value
            .replace('_', "")
            .trim()
            .parse::<BigInt>()
            .map_err(|_| format!("{:?} is not a number", value))
    });
    stdlib.register_native("native as_string(value: number): string;", |_: &mut RunContext, value: BigInt| {
        value.to_string()
    });
    stdlib.register_native("native as_string(value: real): string;", |_: &mut RunContext, value: f64| {
        Value::Real(value).to_string()
    });
    stdlib.register_native("native as_string(value: logic): string;", |_: &mut RunContext, value: bool| {
        value.to_string()
    });
    stdlib.register_native(
        "native as_string(value: material): string;",
        |_: &mut RunContext, value: Material| value.to_string(),
    );
    stdlib.register_native(
        "native as_material(value: string): material;",
        |_: &mut RunContext, value: String| {
            Material::parse(&value).ok_or_else(|| format!("{:?} is not a material", value))
        },
    );
}

// Strings

fn char_slice(text: &str, begin: &BigInt, end: &BigInt) -> Result<String, String> {
    let length = text.chars().count();
    let begin = begin.to_usize().filter(|begin| *begin <= length);
    let end = end.to_usize().filter(|end| *end <= length);

    match (begin, end) {
        (Some(begin), Some(end)) if begin <= end => Ok(text.chars().skip(begin).take(end - begin).collect()),
        _ => Err(format!("substring range out of bounds for length {}", length)),
    }
}

fn index_of(_: &mut RunContext, text: String, part: String) -> BigInt {
    match text.find(&part) {
        Some(byte_index) => BigInt::from(text[..byte_index].chars().count()),
        None => BigInt::from(-1),
    }
}

fn matches(_: &mut RunContext, text: String, pattern: String) -> Result<bool, String> {
    let regex = Regex::new(&format!("^(?:{})$", pattern)).map_err(|err| err.to_string())?;
    Ok(regex.is_match(&text))
}

fn register_strings(stdlib: &mut StandardLibrary) {
    stdlib.register_native("native length(text: string): number;", |_: &mut RunContext, text: String| {
        BigInt::from(text.chars().count())
    });
    stdlib.register_native("native upper(text: string): string;", |_: &mut RunContext, text: String| {
        text.to_uppercase()
    });
    stdlib.register_native("native lower(text: string): string;", |_: &mut RunContext, text: String| {
        text.to_lowercase()
    });
    stdlib.register_native(
        "native contains(text: string, part: string): logic;",
        |_: &mut RunContext, text: String, part: String| text.contains(&part),
    );
    stdlib.register_native(
        "native starts_with(text: string, prefix: string): logic;",
        |_: &mut RunContext, text: String, prefix: String| text.starts_with(&prefix),
    );
    stdlib.register_native(
        "native ends_with(text: string, suffix: string): logic;",
        |_: &mut RunContext, text: String, suffix: String| text.ends_with(&suffix),
    );
    stdlib.register_native("native index_of(text: string, part: string): number;", index_of);
    stdlib.register_native(
        "native substring(text: string, begin: number, end: number): string;",
        |_: &mut RunContext, text: String, begin: BigInt, end: BigInt| char_slice(&text, &begin, &end),
    );
    stdlib.register_native(
        "native replace(text: string, target: string, replacement: string): string;",
        |_: &mut RunContext, text: String, target: String, replacement: String| text.replace(&target, &replacement),
    );
    stdlib.register_native("native trim(text: string): string;", |_: &mut RunContext, text: String| {
        text.trim().to_string()
    });
    stdlib.register_native("native is_empty(text: string): logic;", |_: &mut RunContext, text: String| {
        text.is_empty()
    });
    stdlib.register_native(
        "native equals_ignore_case(a: string, b: string): logic;",
        |_: &mut RunContext, a: String, b: String| a.to_lowercase() == b.to_lowercase(),
    );
    stdlib.register_native(
        "native compare_to(a: string, b: string): number;",
        |_: &mut RunContext, a: String, b: String| BigInt::from(a.cmp(&b) as i8),
    );
    stdlib.register_native("native matches(text: string, pattern: string): logic;", matches);
}

// Randomness

fn random_real(context: &mut RunContext, min: f64, max: f64) -> Result<f64, String> {
    if !min.is_finite() || !max.is_finite() {
        return Err(format!("bounds must be finite, received {} and {}", min, max));
    }
    if !(max > min) {
        return Err(String::from("max must be greater than min"));
    }
    if !(max - min).is_finite() {
        return Err(format!("range from {} to {} is too wide", min, max));
    }
    Ok(context.random.gen_range(min..max))
}

fn random_number(context: &mut RunContext, min: BigInt, max: BigInt) -> Result<BigInt, String> {
    if max <= min {
        return Err(String::from("max must be greater than min"));
    }
    let (min, max) = (to_i64(&min)?, to_i64(&max)?);
    Ok(BigInt::from(context.random.gen_range(min..max)))
}

fn seed(context: &mut RunContext, value: BigInt) {
    // Only the low 64 bits matter.
    let low = (&value & BigInt::from(u64::MAX)).to_u64().unwrap_or_default();
    context.reseed(low);
}

fn register_randomness(stdlib: &mut StandardLibrary) {
    stdlib.register_native("native random(min: real, max: real): real;", random_real);
    stdlib.register_native("native random(min: number, max: number): number;", random_number);
    stdlib.register_native("native seed(value: number);", seed);
}

// Collections

fn size_resolver(types: &[Type]) -> Option<Function> {
    match types {
        [collection @ (Type::List(_) | Type::Map(_, _))] => Some(Function::native(
            "size",
            vec![collection.clone()],
            vec![String::from("collection")],
            Some(Type::NUMBER),
            Rc::new(|_: &mut RunContext, arguments: Vec<Value>| match arguments.first() {
                Some(Value::List(items)) => Ok(Value::from(items.len() as i64)),
                Some(Value::Map(map)) => Ok(Value::from(map.len() as i64)),
                _ => Err(String::from("expected a list or a map")),
            }),
        )),
        _ => None,
    }
}

fn append_resolver(types: &[Type]) -> Option<Function> {
    match types {
        [list @ Type::List(element), item] if element.accepts(item) => Some(Function::native(
            "append",
            vec![list.clone(), item.clone()],
            vec![String::from("list"), String::from("element")],
            Some(list.clone()),
            Rc::new(|_: &mut RunContext, arguments: Vec<Value>| {
                let mut arguments = arguments.into_iter();
                match (arguments.next(), arguments.next()) {
                    (Some(Value::List(mut items)), Some(item)) => {
                        items.push(item);
                        Ok(Value::List(items))
                    }
                    _ => Err(String::from("expected a list and an element")),
                }
            }),
        )),
        _ => None,
    }
}

fn has_resolver(types: &[Type]) -> Option<Function> {
    match types {
        [map @ Type::Map(key, _), candidate] if key.accepts(candidate) => Some(Function::native(
            "has",
            vec![map.clone(), candidate.clone()],
            vec![String::from("map"), String::from("key")],
            Some(Type::LOGIC),
            Rc::new(|_: &mut RunContext, arguments: Vec<Value>| match arguments.as_slice() {
                [Value::Map(map), key] => Ok(Value::Logic(map.contains_key(key))),
                _ => Err(String::from("expected a map and a key")),
            }),
        )),
        _ => None,
    }
}

fn keys_resolver(types: &[Type]) -> Option<Function> {
    match types {
        [map @ Type::Map(key, _)] => Some(Function::native(
            "keys",
            vec![map.clone()],
            vec![String::from("map")],
            Some(Type::list((**key).clone())),
            Rc::new(|_: &mut RunContext, arguments: Vec<Value>| match arguments.first() {
                Some(Value::Map(map)) => Ok(Value::List(map.keys().cloned().collect())),
                _ => Err(String::from("expected a map")),
            }),
        )),
        _ => None,
    }
}

fn register_collections(stdlib: &mut StandardLibrary) {
    stdlib.register_dynamic("size", size_resolver);
    stdlib.register_dynamic("append", append_resolver);
    stdlib.register_dynamic("has", has_resolver);
    stdlib.register_dynamic("keys", keys_resolver);
}
