use crate::{lower::Lower, serializer::NamedParams, Serializer, Statement};

use indexmap::IndexMap;
use relata_core::{
    stmt::{Query, Value},
    Config, Error, MappingCollection, MappingResolver, Result,
};
use std::sync::Arc;

/// Rendered SQL with its named parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Sql {
    pub text: String,
    pub params: IndexMap<String, Value>,
}

/// Finalises queries against their mapping and renders them for one
/// database flavor.
#[derive(Debug)]
pub struct Renderer<'a> {
    resolver: &'a MappingResolver,
    config: &'a Config,
    serializer: Serializer,
}

impl<'a> Renderer<'a> {
    pub fn new(resolver: &'a MappingResolver, config: &'a Config, serializer: Serializer) -> Self {
        Self {
            resolver,
            config,
            serializer: serializer.quote_identifiers(config.quote_identifiers),
        }
    }

    pub fn serializer(&self) -> &Serializer {
        &self.serializer
    }

    /// Mapping of the query's class, joined deep enough for every path the
    /// query uses.
    pub fn mapping(&self, query: &Query) -> Result<Arc<MappingCollection>> {
        self.resolver
            .resolve_with(query.class_name(), self.config, &query.required_paths())
    }

    /// Finalise `query` and return the mapping it was finalised with.
    pub fn finalise(&self, query: &mut Query) -> Result<Arc<MappingCollection>> {
        let mapping = self.mapping(query)?;
        query.finalise(&mapping)?;
        Ok(mapping)
    }

    pub fn render(&self, query: &Query) -> Result<Sql> {
        let stmt = self.lower(query)?;
        Ok(self.serialize(&stmt))
    }

    /// Render with positional placeholders.
    pub fn render_positional(&self, query: &Query) -> Result<(String, Vec<Value>)> {
        let stmt = self.lower(query)?;
        let mut params = vec![];
        let text = self.serializer.serialize(&stmt, &mut params);

        tracing::debug!(sql = %text, params = params.len(), "rendered query");
        Ok((text, params))
    }

    /// Render a query counting the records a select returns.
    pub fn render_count(&self, query: &Query) -> Result<Sql> {
        let Query::Select(select) = query else {
            return Err(Error::query(format!(
                "only selects can be counted, got a write on `{}`",
                query.class_name()
            )));
        };

        let mapping = self.checked_mapping(query)?;
        let stmt = Lower::new(&mapping, self.resolver, self.config, &self.serializer)
            .lower_count(select)?;
        Ok(self.serialize(&stmt.into()))
    }

    fn lower(&self, query: &Query) -> Result<Statement> {
        let mapping = self.checked_mapping(query)?;
        Lower::new(&mapping, self.resolver, self.config, &self.serializer).lower(query)
    }

    fn checked_mapping(&self, query: &Query) -> Result<Arc<MappingCollection>> {
        if !query.is_finalised() {
            return Err(Error::query(format!(
                "query on `{}` rendered before it was finalised",
                query.class_name()
            )));
        }

        self.mapping(query)
    }

    fn serialize(&self, stmt: &Statement) -> Sql {
        let mut params = NamedParams::new();
        let text = self.serializer.serialize(stmt, &mut params);

        tracing::debug!(sql = %text, params = params.len(), "rendered query");

        Sql {
            text,
            params: params.into_inner(),
        }
    }
}
