use quick_xml::events::Event;
use quick_xml::Reader;

/// Reject bytes that are not a single well-formed XML document.
pub(crate) fn check_well_formed(data: &[u8]) -> Result<(), String> {
    let mut reader = Reader::from_reader(data);
    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut roots = 0usize;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(_)) => {
                if depth == 0 {
                    roots += 1;
                }
                depth += 1;
            }
            Ok(Event::Empty(_)) if depth == 0 => roots += 1,
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(e.to_string()),
        }
        buf.clear();
    }
    match (roots, depth) {
        (1, 0) => Ok(()),
        (0, _) => Err("no root element".to_string()),
        (_, 0) => Err("more than one root element".to_string()),
        _ => Err("unexpected end of document".to_string()),
    }
}
