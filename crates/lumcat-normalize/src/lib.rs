//! Value-level normalization for the legacy catalog export: tokenizing raw
//! fields, canonicalizing catalog names, and deriving slugs.

pub mod parse;
pub mod slug;
pub mod synonyms;

pub use parse::{
    normalize_label_list, normalize_list, normalize_path_list, parse_flag, parse_number,
    parse_quantity, parse_voltage_range, to_int_list, to_num_list, VoltageRange,
};
pub use slug::{fold_diacritics, lookup_key, slugify};
pub use synonyms::{canonicalize, title_case, Domain, Synonyms};
