//! Static-priority bus arbiter.
//!
//! Multiplexes N master ports onto one downstream bus. Port 0 has the
//! highest priority. While the downstream bus is idle the arbiter snapshots
//! every port's `cyc` flag; the grant is the lowest-numbered requester in
//! that snapshot, isolated with `req & req.wrapping_neg()`, and holds until
//! the bus returns to idle. Non-granted ports see neither `ack` nor `err`;
//! all ports observe the shared read data.

use crate::bus::{BusRequest, BusResponse};

/// Priority arbiter state. The request snapshot is registered, so a new
/// grant is issued the cycle after the bus goes idle.
#[derive(Debug, Default)]
pub struct BusArbiter {
    req: u32,
    granted: Option<usize>,
}

impl BusArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The port currently owning the bus, if any.
    pub fn granted(&self) -> Option<usize> {
        self.granted
    }

    /// Advances arbitration by one cycle given every port's current `cyc`.
    ///
    /// Returns the granted port index for this cycle.
    pub fn step(&mut self, cycs: &[bool]) -> Option<usize> {
        debug_assert!(cycs.len() <= 32);

        let gnt = self.req & self.req.wrapping_neg();
        let candidate = (gnt != 0).then(|| gnt.trailing_zeros() as usize);
        self.granted = candidate.filter(|&i| i < cycs.len() && cycs[i]);

        // Re-snapshot whenever the downstream bus is idle.
        if self.granted.is_none() {
            self.req = cycs
                .iter()
                .enumerate()
                .fold(0, |acc, (i, &c)| acc | (u32::from(c) << i));
        }

        self.granted
    }

    /// Splits the shared response between the granted port and the rest.
    ///
    /// The granted port receives the response unchanged; every other port
    /// sees `ack = err = false` with the shared `dat_r`.
    pub fn route(&self, resp: &BusResponse, port: usize) -> BusResponse {
        if self.granted == Some(port) {
            *resp
        } else {
            BusResponse {
                dat_r: resp.dat_r,
                ack: false,
                err: false,
            }
        }
    }

    /// The downstream request: the granted port's request, or an idle bus.
    pub fn downstream(&self, ports: &[&BusRequest]) -> BusRequest {
        match self.granted {
            Some(i) => *ports[i],
            None => BusRequest::default(),
        }
    }
}
