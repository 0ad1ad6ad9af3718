//! Tests for log level functionality.

use logweave::Level;

#[test]
fn level_ordering() {
    assert!(Level::All < Level::Trace);
    assert!(Level::Trace < Level::Debug);
    assert!(Level::Debug < Level::Info);
    assert!(Level::Info < Level::Warn);
    assert!(Level::Warn < Level::Error);
    assert!(Level::Error < Level::Fatal);
    assert!(Level::Fatal < Level::Off);
}

#[test]
fn level_display() {
    assert_eq!(Level::Trace.to_string(), "TRACE");
    assert_eq!(Level::Debug.to_string(), "DEBUG");
    assert_eq!(Level::Info.to_string(), "INFO");
    assert_eq!(Level::Warn.to_string(), "WARN");
    assert_eq!(Level::Error.to_string(), "ERROR");
    assert_eq!(Level::Off.to_string(), "OFF");
}

#[test]
fn level_from_str() {
    assert_eq!("trace".parse::<Level>().unwrap(), Level::Trace);
    assert_eq!("DEBUG".parse::<Level>().unwrap(), Level::Debug);
    assert_eq!("Info".parse::<Level>().unwrap(), Level::Info);
    assert_eq!("warning".parse::<Level>().unwrap(), Level::Warn);
    assert_eq!("err".parse::<Level>().unwrap(), Level::Error);
    assert_eq!(" fatal ".parse::<Level>().unwrap(), Level::Fatal);
}

#[test]
fn level_from_str_accepts_legacy_names() {
    assert_eq!("FINEST".parse::<Level>().unwrap(), Level::Trace);
    assert_eq!("config".parse::<Level>().unwrap(), Level::Debug);
    assert_eq!("SEVERE".parse::<Level>().unwrap(), Level::Error);
}

#[test]
fn level_from_str_invalid() {
    let err = "invalid".parse::<Level>().unwrap_err();
    assert_eq!(err.input(), "invalid");
}

#[test]
fn level_default() {
    assert_eq!(Level::default(), Level::Info);
}

#[test]
fn int_values_follow_ordering() {
    let weights: Vec<i32> = Level::loggable().iter().map(|l| l.int_value()).collect();
    assert!(weights.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(Level::All.int_value(), i32::MIN);
    assert_eq!(Level::Off.int_value(), i32::MAX);
}
