#![no_main]
use libfuzzer_sys::fuzz_target;
use logweave::formatters::Template;

fuzz_target!(|data: &str| {
    let template = Template::parse(data);
    let _ = template.segments().len();
});
