use serde_yaml::Value;

/// Deep-merge `overlay` onto a copy of `base`.
///
/// For each key of `overlay`: when both sides hold a mapping the merge
/// recurses, otherwise the overlay value replaces the base value wholesale
/// (lists, scalars and `null` included). Keys only in `base` are kept in
/// place. A non-mapping overlay replaces `base` entirely.
#[must_use]
pub fn merge(base: &Value, overlay: &Value) -> Value {
    let mut merged = base.clone();
    merge_into(&mut merged, overlay);
    merged
}

pub(crate) fn merge_into(target: &mut Value, overlay: &Value) {
    match (target, overlay) {
        (Value::Mapping(target), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                if value.is_mapping() {
                    if let Some(existing) = target.get_mut(key).filter(|e| e.is_mapping()) {
                        merge_into(existing, value);
                        continue;
                    }
                }
                target.insert(key.clone(), value.clone());
            }
        }
        (target, overlay) => *target = overlay.clone(),
    }
}
