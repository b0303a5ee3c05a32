//! Query Builder
//!
//! Assembles a boolean search query from a validated [`SearchRequest`] and
//! renders it as the index's JSON query DSL.

use serde::{Serialize, Serializer};
use serde_json::{json, Value};

use super::params::{SearchRequest, SortOrder};

/// Upper bound on the number of hits requested from the index
pub const MAX_RESULTS: usize = 100;

/// Document fields the engine queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Location,
    Amenities,
    Price,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Location => "location",
            Field::Amenities => "amenities",
            Field::Price => "price",
        }
    }
}

/// A single filter inside the top-level `must` list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// Fuzzy match OR `*term*` wildcard match on the same field
    FuzzyOrWildcard { field: Field, term: String },
    /// Fuzzy match only
    Fuzzy { field: Field, term: String },
    /// Inclusive numeric range; builders emit one bound per clause
    Range {
        field: Field,
        gte: Option<u64>,
        lte: Option<u64>,
    },
}

impl Clause {
    pub fn to_dsl(&self) -> Value {
        match self {
            Clause::FuzzyOrWildcard { field, term } => {
                let name = field.as_str();
                json!({
                    "bool": {
                        "should": [
                            { "fuzzy": { name: term } },
                            { "wildcard": { name: format!("*{}*", term) } },
                        ]
                    }
                })
            }
            Clause::Fuzzy { field, term } => json!({ "fuzzy": { field.as_str(): term } }),
            Clause::Range { field, gte, lte } => {
                let mut bounds = serde_json::Map::new();
                if let Some(gte) = gte {
                    bounds.insert("gte".to_string(), json!(gte));
                }
                if let Some(lte) = lte {
                    bounds.insert("lte".to_string(), json!(lte));
                }
                json!({ "range": { field.as_str(): bounds } })
            }
        }
    }
}

/// A complete query: AND of all clauses, optional price sort, fixed size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub must: Vec<Clause>,
    pub sort: Option<SortOrder>,
    pub size: usize,
}

impl SearchQuery {
    /// Build the query for a validated request.
    ///
    /// Clause order follows the request fields: title, amenities, minprice,
    /// maxprice, location. Location is always present.
    pub fn build(request: &SearchRequest) -> Self {
        let mut must = Vec::new();

        if let Some(title) = &request.title {
            must.push(Clause::FuzzyOrWildcard {
                field: Field::Title,
                term: title.clone(),
            });
        }

        if let Some(amenities) = &request.amenities {
            must.push(Clause::Fuzzy {
                field: Field::Amenities,
                term: amenities.clone(),
            });
        }

        if let Some(min) = request.min_price {
            must.push(Clause::Range {
                field: Field::Price,
                gte: Some(min),
                lte: None,
            });
        }

        if let Some(max) = request.max_price {
            must.push(Clause::Range {
                field: Field::Price,
                gte: None,
                lte: Some(max),
            });
        }

        must.push(Clause::FuzzyOrWildcard {
            field: Field::Location,
            term: request.location.clone(),
        });

        Self {
            must,
            sort: request.sort,
            size: MAX_RESULTS,
        }
    }

    /// Render as index query DSL; `sort` is left out when not requested
    pub fn to_dsl(&self) -> Value {
        let must: Vec<Value> = self.must.iter().map(Clause::to_dsl).collect();
        let mut body = json!({
            "query": { "bool": { "must": must } },
            "size": self.size,
        });
        if let Some(order) = self.sort {
            let price = Field::Price.as_str();
            body["sort"] = json!([{ price: { "order": order.as_str() } }]);
        }
        body
    }
}

impl Serialize for SearchQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_dsl().serialize(serializer)
    }
}
