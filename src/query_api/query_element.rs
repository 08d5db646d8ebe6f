// SPDX-License-Identifier: MIT OR Apache-2.0

/// Source position carried by every parse tree node.
///
/// Positions are `(line, column)` pairs as reported by the parser; nodes built
/// programmatically have none.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct QueryElement {
    pub query_context_start_index: Option<(i32, i32)>,
    pub query_context_end_index: Option<(i32, i32)>,
}

impl QueryElement {
    pub fn new(
        start_index: Option<(i32, i32)>,
        end_index: Option<(i32, i32)>,
    ) -> Self {
        QueryElement {
            query_context_start_index: start_index,
            query_context_end_index: end_index,
        }
    }

    pub fn at(line: i32, column: i32) -> Self {
        QueryElement {
            query_context_start_index: Some((line, column)),
            query_context_end_index: None,
        }
    }
}
