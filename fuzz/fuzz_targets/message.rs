#![no_main]

use libfuzzer_sys::fuzz_target;
use reach_core::message::{
    ClientHello, ServerHello, SessionChallenge, SessionResponse, SrpClientKeyExchange,
    SrpIdentify, SrpServerKeyExchange, Version,
};

fuzz_target!(|data: &[u8]| {
    // Fuzz payload parsing - should never panic on any input.
    let _ = ClientHello::parse(data);
    let _ = ServerHello::parse(data);
    let _ = SrpIdentify::parse(data);
    let _ = SrpServerKeyExchange::parse(data);
    let _ = SrpClientKeyExchange::parse(data);
    let _ = SessionChallenge::parse(data);
    let _ = SessionResponse::parse(data);
    let _ = Version::parse(data);
});
