use diesel::prelude::*;
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

/// A direct pairing between two members.
///
/// The pair is canonically ordered so that `member_id_one` sorts before
/// `member_id_two`; a uniqueness constraint on the ordered pair guarantees at
/// most one row per unordered pair of members.
#[derive(Clone, Debug, Queryable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::conversations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: Uuid,
    pub member_id_one: Uuid,
    pub member_id_two: Uuid,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::conversations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewConversation {
    pub member_id_one: Uuid,
    pub member_id_two: Uuid,
}

impl NewConversation {
    /// Canonicalizes the pair as a defensive pre-save step; callers are
    /// expected to have ordered the ids already.
    #[must_use]
    pub fn between(a: Uuid, b: Uuid) -> Self {
        let (member_id_one, member_id_two) = canonical_pair(a, b);
        Self {
            member_id_one,
            member_id_two,
        }
    }
}

/// Orders two member ids so the lower sorts first. `Uuid` ordering matches
/// the lexicographic order of the canonical hyphenated string form.
#[must_use]
pub fn canonical_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a <= b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_pair_is_order_independent() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(canonical_pair(a, b), canonical_pair(b, a));
    }

    #[test]
    fn canonical_pair_sorts_low_first() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let (one, two) = canonical_pair(a, b);
        assert!(one <= two);
        assert!(one.to_string() <= two.to_string());
    }

    #[test]
    fn between_applies_canonical_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let row = NewConversation::between(b, a);
        assert!(row.member_id_one <= row.member_id_two);
    }
}
