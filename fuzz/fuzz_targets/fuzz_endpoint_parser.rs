// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use hpub::transport::{parse, StaticResolver};
use std::net::{IpAddr, Ipv4Addr};

fuzz_target!(|data: &[u8]| {
    let Ok(spec) = std::str::from_utf8(data) else {
        return;
    };

    // Never hit DNS from the fuzzer
    let resolver = StaticResolver::new().with_host("localhost", IpAddr::V4(Ipv4Addr::LOCALHOST));

    if let Ok(endpoint) = parse(spec, &resolver) {
        // Canonical form must parse back to the same endpoint
        let again = parse(&endpoint.to_string(), &resolver);
        assert_eq!(again.ok(), Some(endpoint));
    }
});
