#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    password: &'a str,
    stored: &'a str,
}

fuzz_target!(|input: Input<'_>| {
    // Любая строка записи: только true/false, без паник.
    let _ = authplug::verify(input.password, input.stored);

    let tagged = format!("PBKDF2$sha256${}", input.stored);
    let _ = authplug::verify(input.password, &tagged);
});
