#![no_main]
use libfuzzer_sys::fuzz_target;
use logweave::{LogContext, LogContextConfiguration, LoggingConfig};

fuzz_target!(|data: &str| {
    let Ok(file) = LoggingConfig::from_toml_str(data) else {
        return;
    };
    let mut config = LogContextConfiguration::new(LogContext::new());
    if file.apply(&mut config).is_ok() {
        let _ = config.commit();
    }
    config.forget();
});
