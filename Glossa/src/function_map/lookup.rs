//! Function resolution by id and by display name

use super::{FunctionInfo, FunctionMap};

impl FunctionMap {
    /// Function for a raw `(group, type)` record.
    ///
    /// Falls back to the group's discard function when no definition claims
    /// the type id.
    #[must_use]
    pub fn get(&self, group: u16, type_id: u16) -> Option<&FunctionInfo> {
        let entry = self.groups.get(&group)?;
        entry
            .types
            .get(&type_id)
            .or(entry.discard.as_ref())
            .map(|&index| &self.functions[index])
    }

    /// Function for a display name as written in text.
    ///
    /// Accepted shapes, compared case-insensitively: `name`, `group:type`,
    /// `group:mapValue`, `name:type` (also matching a discard function) and
    /// `name:mapValue`. The caller resolves the type id from the second part.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&FunctionInfo> {
        let Some((head, tail)) = name.split_once(':') else {
            return self
                .groups
                .values()
                .flat_map(|entry| entry.types.values())
                .map(|&index| &self.functions[index])
                .find(|function| function.name.eq_ignore_ascii_case(name));
        };

        let head_group = head.parse::<u16>().ok();
        let tail_type = tail.parse::<u16>().ok();
        if let (Some(group), Some(type_id)) = (head_group, tail_type) {
            return self.get(group, type_id);
        }

        for (group, entry) in &self.groups {
            let mut typed = entry.types.values().map(|&index| &self.functions[index]);

            if head_group == Some(*group) {
                if let Some(function) = typed
                    .clone()
                    .find(|function| function.type_for_value(tail).is_some())
                {
                    return Some(function);
                }
            }

            if let Some(type_id) = tail_type {
                let candidates = entry.types.get(&type_id).into_iter().chain(&entry.discard);
                for &index in candidates {
                    let function = &self.functions[index];
                    if function.name.eq_ignore_ascii_case(head) {
                        return Some(function);
                    }
                }
            }

            if let Some(function) = typed.find(|function| {
                function.name.eq_ignore_ascii_case(head) && function.type_for_value(tail).is_some()
            }) {
                return Some(function);
            }
        }

        None
    }
}
