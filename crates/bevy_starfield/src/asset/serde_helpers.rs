/// Declares `default_<name>()` and `is_default_<name>()` for a serde field so the
/// default is written once and shared by `#[serde(default = ...)]` and
/// `#[serde(skip_serializing_if = ...)]`.
macro_rules! serde_default {
    ($name:ident, $ty:ty, $val:expr) => {
        ::paste::paste! {
            fn [<default_ $name>]() -> $ty { $val }
            fn [<is_default_ $name>](v: &$ty) -> bool { *v == [<default_ $name>]() }
        }
    };
}

pub(crate) use serde_default;
