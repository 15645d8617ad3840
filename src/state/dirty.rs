use super::Slot;
use crate::schema::EntityDescriptor;

/// Positions whose current value differs from the previously loaded value,
/// or `None` when nothing changed.
///
/// Non-updatable attributes never report dirty. An unfetched current slot is
/// clean (there is nothing new to write); a fetched current slot with no
/// previous state to compare against is dirty, since the write cannot be
/// proven redundant.
pub fn find_dirty(
    descriptor: &EntityDescriptor,
    current: &[Slot],
    previous: Option<&[Slot]>,
) -> Option<Vec<usize>> {
    let mut dirty = vec![];

    for attribute in &descriptor.attributes {
        if !attribute.updatable || !attribute.dirty_checkable {
            continue;
        }

        let position = attribute.state_position;
        let new = match &current[position] {
            Slot::Loaded(value) => value,
            Slot::Unfetched => continue,
        };

        let changed = match previous.map(|slots| &slots[position]) {
            Some(Slot::Loaded(old)) => attribute.is_dirty(old, new),
            Some(Slot::Unfetched) | None => true,
        };

        if changed {
            dirty.push(position);
        }
    }

    if dirty.is_empty() {
        None
    } else {
        Some(dirty)
    }
}

/// Like [`find_dirty`], but only considers positions flagged in `include`.
/// Used when the caller already knows which attributes a statement touches.
pub fn find_modified(
    descriptor: &EntityDescriptor,
    current: &[Slot],
    previous: Option<&[Slot]>,
    include: &[bool],
) -> Option<Vec<usize>> {
    let mut modified = vec![];

    for attribute in &descriptor.attributes {
        let position = attribute.state_position;
        if !include[position] || !attribute.dirty_checkable {
            continue;
        }

        let new = match &current[position] {
            Slot::Loaded(value) => value,
            Slot::Unfetched => continue,
        };

        let changed = match previous.map(|slots| &slots[position]) {
            Some(Slot::Loaded(old)) => attribute.is_dirty(old, new),
            Some(Slot::Unfetched) | None => true,
        };

        if changed {
            modified.push(position);
        }
    }

    if modified.is_empty() {
        None
    } else {
        Some(modified)
    }
}
