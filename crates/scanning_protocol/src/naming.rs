//! Object-store key naming and case UID normalisation.
//!
//! Keys embed a UUIDv7 so that a bucket listing sorts by arrival.

use uuid::Uuid;

const SET_PREFIX: &str = "SET_";
const FORM_PREFIX: &str = "FORM_DDC_";

/// `SET_<uuidv7>.xml`
pub fn set_object_key(id: Uuid) -> String {
    format!("{}{}.xml", SET_PREFIX, id)
}

/// `FORM_DDC_<uuidv7>_<docType>.xml`
pub fn form_object_key(id: Uuid, doc_type: &str) -> String {
    format!("{}{}_{}.xml", FORM_PREFIX, id, doc_type)
}

/// Matches `^7[0-9]{3}-[0-9]{4}-[0-9]{4}$`.
fn is_dashed_case_uid(uid: &str) -> bool {
    let bytes = uid.as_bytes();
    bytes.len() == 14
        && bytes[0] == b'7'
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 9 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Strip dashes from `7xxx-xxxx-xxxx` case UIDs. Anything else is returned untouched.
pub fn normalize_uid(uid: &str) -> String {
    if is_dashed_case_uid(uid) {
        uid.replace('-', "")
    } else {
        uid.to_string()
    }
}
