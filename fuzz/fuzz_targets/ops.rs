#![no_main]

use ethersrv::parser::ops;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = ops::path::args(data);
    let _ = ops::read::args(data);
    let _ = ops::write::args(data);
    let _ = ops::open::args(data);
    let _ = ops::rename::args(data);
    let _ = ops::find_first::args(data);
    let _ = ops::find_next::args(data);
    let _ = ops::seek_end::args(data);
    let _ = ops::set_attr::args(data);
});
