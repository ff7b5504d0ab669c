//! Session links
//!
//! Sessions are shared as `/s/{session_id}` links. Players may paste either a
//! bare session id or a full link into a join box; [`parse_session_id_input`]
//! accepts both.

use uuid::{Uuid, Variant};

use crate::schema::SessionId;

const SESSION_SEGMENT: &str = "/s/";
const UUID_TEXT_LEN: usize = 36;

/// Path of the live session view
#[must_use]
pub fn session_route(session_id: SessionId) -> String {
    format!("/s/{session_id}")
}

/// Path of the game-over view
#[must_use]
pub fn session_over_route(session_id: SessionId) -> String {
    format!("/s/{session_id}/over")
}

/// Hyphenated RFC 4122 UUID of version 1-5
fn parse_canonical_uuid(text: &str) -> Option<Uuid> {
    if text.len() != UUID_TEXT_LEN {
        return None;
    }
    let uuid = Uuid::try_parse(text).ok()?;
    let version_ok = matches!(uuid.get_version_num(), 1..=5);
    (version_ok && uuid.get_variant() == Variant::RFC4122).then_some(uuid)
}

/// Extract a session id from a pasted id or link
///
/// Accepts a bare id (surrounding whitespace ignored) or any text containing
/// `/s/{id}` followed by `/`, `?`, `#` or the end of the input.
#[must_use]
pub fn parse_session_id_input(input: &str) -> Option<SessionId> {
    let trimmed = input.trim();
    if let Some(uuid) = parse_canonical_uuid(trimmed) {
        return Some(SessionId(uuid));
    }

    trimmed.match_indices(SESSION_SEGMENT).find_map(|(start, _)| {
        let rest = &trimmed[start + SESSION_SEGMENT.len()..];
        let candidate = rest.get(..UUID_TEXT_LEN)?;
        let terminated = rest[UUID_TEXT_LEN..]
            .chars()
            .next()
            .map_or(true, |next| matches!(next, '/' | '?' | '#'));
        if !terminated {
            return None;
        }
        parse_canonical_uuid(candidate).map(SessionId)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "0b6f9f0c-4a3e-4d8e-9c1f-2a3b4c5d6e7f";

    fn id() -> SessionId {
        ID.parse().unwrap()
    }

    #[test]
    fn test_routes() {
        assert_eq!(session_route(id()), format!("/s/{ID}"));
        assert_eq!(session_over_route(id()), format!("/s/{ID}/over"));
    }

    #[test]
    fn test_bare_id_with_whitespace_and_uppercase() {
        assert_eq!(parse_session_id_input(&format!("  {ID}\n")), Some(id()));
        assert_eq!(parse_session_id_input(&ID.to_uppercase()), Some(id()));
    }

    #[test]
    fn test_links() {
        for input in [
            format!("https://five-by.example/s/{ID}"),
            format!("https://five-by.example/s/{ID}/over"),
            format!("/s/{ID}?ref=share"),
            format!("five-by.example/s/{ID}#board"),
        ] {
            assert_eq!(parse_session_id_input(&input), Some(id()), "{input}");
        }
    }

    #[test]
    fn test_rejects_other_input() {
        assert_eq!(parse_session_id_input(""), None);
        assert_eq!(parse_session_id_input("not-a-session"), None);
        assert_eq!(parse_session_id_input(&format!("/s/{ID}x")), None);
        assert_eq!(parse_session_id_input(&format!("/x/{ID}")), None);
        // nil uuid has version 0
        assert_eq!(
            parse_session_id_input("00000000-0000-0000-0000-000000000000"),
            None
        );
        // simple form without hyphens
        assert_eq!(
            parse_session_id_input("0b6f9f0c4a3e4d8e9c1f2a3b4c5d6e7f"),
            None
        );
    }
}
