//! Appends a `@PG` record for this program to an existing header.

use anyhow::Result;
use bstr::BString;
use noodles::sam::Header;
use noodles::sam::header::record::value::Map;
use noodles::sam::header::record::value::map::Program;
use noodles::sam::header::record::value::map::program::tag;

/// Program name and base `@PG` ID.
pub const PROGRAM_NAME: &str = "mateflow";

/// The ID of the program at the end of the `PP` chain, if any.
///
/// The end of the chain is a program that no other program names as its predecessor. When
/// several qualify, the last one in header order wins.
#[must_use]
pub fn last_program_id(header: &Header) -> Option<String> {
    let programs = header.programs();
    let programs = programs.as_ref();

    let is_predecessor = |id: &[u8]| {
        programs.values().any(|pg| {
            pg.other_fields()
                .get(&tag::PREVIOUS_PROGRAM_ID)
                .is_some_and(|pp| AsRef::<[u8]>::as_ref(pp) == id)
        })
    };

    programs
        .keys()
        .rev()
        .find(|id| !is_predecessor(id.as_slice()))
        .or_else(|| programs.keys().last())
        .map(|id| String::from_utf8_lossy(id).into_owned())
}

/// `base` if unused, otherwise the first free `base.N` for N = 1, 2, ...
#[must_use]
pub fn unique_program_id(header: &Header, base: &str) -> String {
    let programs = header.programs();
    let programs = programs.as_ref();
    if !programs.contains_key(base.as_bytes()) {
        return base.to_string();
    }
    (1..)
        .map(|n| format!("{base}.{n}"))
        .find(|candidate| !programs.contains_key(candidate.as_bytes()))
        .unwrap_or_else(|| base.to_string())
}

/// Adds a `@PG` line carrying the version and command line, chained to the previous program.
///
/// # Errors
///
/// Returns an error if the record cannot be built or added.
pub fn add_pg_record(mut header: Header, version: &str, command_line: &str) -> Result<Header> {
    let previous = last_program_id(&header);
    let id = unique_program_id(&header, PROGRAM_NAME);

    let mut builder = Map::<Program>::builder()
        .insert(tag::NAME, PROGRAM_NAME)
        .insert(tag::VERSION, version)
        .insert(tag::COMMAND_LINE, command_line);
    if let Some(pp) = previous {
        builder = builder.insert(tag::PREVIOUS_PROGRAM_ID, pp);
    }

    header.programs_mut().add(BString::from(id), builder.build()?)?;
    Ok(header)
}
