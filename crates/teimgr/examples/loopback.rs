//! Terminal and network TEI managers wired back to back in one process.
//!
//! Run:
//! - cargo run -p teimgr --example loopback
//! - cargo run -p teimgr --example loopback -- 3   (number of terminal entities)

use std::{env, io, thread, time::Duration};

use crossbeam_channel::{unbounded, Receiver, Sender};
use teimgr::{prelude::*, MessageType};

/// D-channel stand-in: every frame handed down is forwarded to the peer side.
struct Wire(Sender<(CorrelationId, Vec<u8>)>);

impl Link for Wire {
    fn send_frame(&mut self, id: CorrelationId, frame: &[u8]) -> io::Result<()> {
        self.0
            .send((id, frame.to_vec()))
            .map_err(|e| io::Error::new(io::ErrorKind::BrokenPipe, e.to_string()))
    }

    fn request_activation(&mut self) {
        println!("[link] activation requested");
    }
}

/// Delivers frames pending on `wire` from `from` to `to`, confirming each transmission.
fn pump(wire: &Receiver<(CorrelationId, Vec<u8>)>, from: &Device<Wire>, to: &Device<Wire>) -> bool {
    let mut moved = false;
    while let Ok((id, frame)) = wire.try_recv() {
        if let Ok(message) = teimgr::FrameDecoder::decode(&frame) {
            println!(
                "[wire] {} ri=0x{:04x} ai={}",
                message.message_type.name(),
                message.ri,
                message.tei
            );
        }
        from.on_ack(id);
        if let Err(e) = to.dispatch_inbound(&frame) {
            println!("[wire] rejected: {}", e);
        }
        moved = true;
    }
    moved
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let terminals: u8 = env::args().nth(1).and_then(|s| s.parse().ok()).unwrap_or(2);
    let config = TeiConfig::default();

    let (te_tx, te_rx) = unbounded();
    let (nt_tx, nt_rx) = unbounded();
    let te = Device::new(Role::Terminal, Wire(te_tx), &config);
    let nt = Device::new(Role::Network, Wire(nt_tx), &config);

    // The network hands out TEIs from the automatic range in order.
    let mut next_tei = teimgr::MAX_FIXED_TEI + 1;

    let mut entities = Vec::new();
    for _ in 0..terminals {
        let entity = te.create_entity(ChannelRequest::dynamic_terminal())?;
        te.request_assignment(entity)?;
        entities.push(entity);
    }
    te.on_link_activated();
    nt.on_link_activated();

    let mut assigned = 0;
    while assigned < entities.len() {
        let mut busy = pump(&te_rx, &te, &nt);

        while let Some(event) = nt.recv() {
            if let TeiEvent::IdentityRequest { ri, action_indicator } = event {
                let holder = nt.create_entity(ChannelRequest::network(next_tei))?;
                println!("[nt] assigning tei {} for ri=0x{:04x}", next_tei, ri);
                nt.assign_fixed(holder, ri, action_indicator)?;
                next_tei += 1;
            }
        }
        busy |= pump(&nt_rx, &nt, &te);

        while let Some(event) = te.recv() {
            match event {
                TeiEvent::AssignmentComplete { entity, tei } => {
                    println!("[te] {} got tei {}", entity, tei);
                    assigned += 1;
                }
                TeiEvent::AssignmentFailed { entity } => {
                    println!("[te] {} gave up", entity);
                    assigned += 1;
                }
                other => println!("[te] {:?}", other),
            }
        }

        te.poll();
        nt.poll();
        if !busy {
            thread::sleep(Duration::from_millis(10));
        }
    }

    let check = teimgr::TeiMessage::new(MessageType::IdCheckRequest, 0, teimgr::GROUP_TEI, true);
    te.dispatch_inbound(&teimgr::FrameEncoder::encode(&check))?;
    pump(&te_rx, &te, &nt);
    Ok(())
}
