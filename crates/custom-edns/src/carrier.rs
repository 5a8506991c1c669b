// Copyright 2015-2025 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::proto::op::{Edns, Message};

/// A DNS message that can hold an EDNS0 OPT pseudo-record
pub trait EdnsCarrier {
    /// The EDNS record of the message, if it has one
    fn edns_record(&self) -> Option<&Edns>;

    /// Returns the EDNS record of the message, creating it first if needed.
    ///
    /// A created record advertises `max_payload` and has DNSSEC OK cleared. Returns `None`,
    /// without modifying the message, if the message cannot carry EDNS.
    fn edns_or_insert(&mut self, max_payload: u16) -> Option<&mut Edns>;
}

impl EdnsCarrier for Message {
    fn edns_record(&self) -> Option<&Edns> {
        self.extensions().as_ref()
    }

    fn edns_or_insert(&mut self, max_payload: u16) -> Option<&mut Edns> {
        let edns = self.extensions_mut().get_or_insert_with(|| {
            let mut edns = Edns::new();
            edns.set_max_payload(max_payload).set_dnssec_ok(false);
            edns
        });

        Some(edns)
    }
}
