#![no_main]
use libfuzzer_sys::fuzz_target;
use logweave::filters::FilterExpr;
use logweave::runtime::LogRecord;
use logweave::Level;

fuzz_target!(|data: &str| {
    let Ok(expr) = FilterExpr::parse(data) else {
        return;
    };
    // Named references stay unresolved; everything else must build.
    if let Ok(filter) = expr.build(&mut |_| None) {
        let mut record = LogRecord::new(Level::Info, "fuzz", data);
        let _ = filter.is_loggable(&mut record);
    }
});
