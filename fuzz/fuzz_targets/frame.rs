#![no_main]

use libfuzzer_sys::fuzz_target;

const MAC: [u8; 6] = [0x02, 0x00, 0x00, 0x00, 0x00, 0x01];

fuzz_target!(|data: &[u8]| {
    let _ = ethersrv::parser::frame::validate(data, &MAC);
});
