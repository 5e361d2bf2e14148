use failure::Error;
use serde::Serialize;
use std::io;

use super::history::History;
use crate::envelope::Envelope;

#[derive(Serialize)]
struct Report<'a> {
    mrsp: &'a Envelope,
    history: &'a History,
}

pub fn json_envelope<W: io::Write>(envelope: &Envelope, f: &mut W) -> Result<(), Error> {
    serde_json::to_writer_pretty(f, envelope)?;
    Ok(())
}

pub fn json_report<W: io::Write>(envelope: &Envelope, history: &History, f: &mut W) -> Result<(), Error> {
    serde_json::to_writer_pretty(f, &Report { mrsp: envelope, history })?;
    Ok(())
}
