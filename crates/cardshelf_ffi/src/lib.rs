//! Flutter bridge surface over `cardshelf_core`.

pub mod api;
