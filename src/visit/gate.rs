use crate::visit::types::Visit;

/// True when the visit names a party, by reference or by name.
///
/// Checked for visibility and again right before any mutating action.
pub fn has_party(visit: &Visit) -> bool {
    is_present(visit.party_reference.as_deref()) || is_present(visit.party_name.as_deref())
}

fn is_present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}
