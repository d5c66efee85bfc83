use std::{collections::HashSet, sync::Arc, thread};

use anyhow::{Context, anyhow, bail};
use ferrokey::{
    Dialect, EntityDescriptor, GenerationOutcome, IdentifierGenerator,
    IdentifierGeneratorFactory, IdentifierValue, InsertGeneratedIdentifierDelegate,
    MemoryDatabase, PersistentGeneratorRegistry, PostInsertIdentityPersister, Record, SqlValue,
};
use serde::Serialize;

use super::mapping::EntityMapping;

/// A mapping together with its configured generator.
pub struct MappedGenerator {
    pub mapping: EntityMapping,
    pub descriptor: EntityDescriptor,
    pub generator: Arc<dyn IdentifierGenerator>,
}

impl MappedGenerator {
    fn is_post_insert(&self) -> bool {
        self.generator.as_post_insert().is_some()
    }
}

/// One line of `generate` output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GeneratedId {
    pub entity: String,
    pub id: IdentifierValue,
}

pub fn build_generators(
    mappings: &[EntityMapping],
    dialect: &dyn Dialect,
    factory: &IdentifierGeneratorFactory,
) -> anyhow::Result<Vec<MappedGenerator>> {
    mappings
        .iter()
        .map(|mapping| -> anyhow::Result<MappedGenerator> {
            let generator = factory.create(
                &mapping.strategy,
                mapping.identifier_type,
                &mapping.generator_params(),
                dialect,
            )?;
            #[cfg(feature = "tracing")]
            tracing::debug!(
                entity = %mapping.entity,
                strategy = factory.resolve_strategy(&mapping.strategy, dialect),
                "configured generator"
            );
            Ok(MappedGenerator {
                descriptor: mapping.descriptor()?,
                mapping: mapping.clone(),
                generator,
            })
        })
        .collect()
}

/// The create (or drop) script of every persistent generator, each backing
/// object appearing once.
pub fn schema_script(
    generators: &[MappedGenerator],
    dialect: &dyn Dialect,
    drop: bool,
) -> anyhow::Result<Vec<String>> {
    let mut registry = PersistentGeneratorRegistry::new();
    for mapped in generators {
        registry.register(Arc::clone(&mapped.generator));
    }
    let script = if drop {
        registry.sql_drop_strings(dialect)?
    } else {
        registry.sql_create_strings(dialect)?
    };
    Ok(script)
}

/// Exports the schema into a fresh in-memory database and generates `count`
/// identifiers per mapping, spread over `threads` sessions sharing the
/// mapping's generator.
pub fn generate(
    dialect: &Arc<dyn Dialect>,
    generators: &[MappedGenerator],
    count: usize,
    threads: usize,
) -> anyhow::Result<Vec<GeneratedId>> {
    let db = MemoryDatabase::new();
    db.execute_script(&schema_script(generators, dialect.as_ref(), false)?)
        .context("could not export generator schema")?;
    for mapped in generators.iter().filter(|m| m.is_post_insert()) {
        let ddl = mapped.descriptor.sql_create_string(dialect.as_ref(), true)?;
        db.execute_script(&[ddl])
            .with_context(|| format!("could not create table for [{}]", mapped.mapping.entity))?;
    }

    let mut out = Vec::with_capacity(generators.len() * count);
    for mapped in generators {
        let ids = generate_for(&db, dialect, mapped, count, threads)?;
        let distinct: HashSet<&IdentifierValue> = ids.iter().collect();
        if distinct.len() != ids.len() {
            bail!(
                "[{}] generated {} duplicate identifiers",
                mapped.mapping.entity,
                ids.len() - distinct.len()
            );
        }
        #[cfg(feature = "tracing")]
        tracing::info!(entity = %mapped.mapping.entity, count = ids.len(), "generated identifiers");
        out.extend(ids.into_iter().map(|id| GeneratedId {
            entity: mapped.mapping.entity.clone(),
            id,
        }));
    }
    Ok(out)
}

fn generate_for(
    db: &MemoryDatabase,
    dialect: &Arc<dyn Dialect>,
    mapped: &MappedGenerator,
    count: usize,
    threads: usize,
) -> anyhow::Result<Vec<IdentifierValue>> {
    let insert = mapped
        .generator
        .as_post_insert()
        .map(|post| {
            post.insert_generated_identifier_delegate(
                &mapped.descriptor,
                Arc::clone(dialect),
                false,
            )
        })
        .transpose()?;

    thread::scope(|s| -> anyhow::Result<Vec<IdentifierValue>> {
        let handles: Vec<_> = (0..threads)
            .map(|worker| {
                let share = count / threads + usize::from(worker < count % threads);
                let insert = insert.as_ref();
                s.spawn(move || dispense(db, mapped, insert, worker, share))
            })
            .collect();

        let mut ids = Vec::with_capacity(count);
        for handle in handles {
            let batch = handle
                .join()
                .map_err(|_| anyhow!("generator thread panicked"))??;
            ids.extend(batch);
        }
        Ok(ids)
    })
}

/// Generates `count` identifiers on a session of its own. Post-insert
/// strategies insert a row per identifier.
fn dispense(
    db: &MemoryDatabase,
    mapped: &MappedGenerator,
    insert: Option<&InsertGeneratedIdentifierDelegate>,
    worker: usize,
    count: usize,
) -> anyhow::Result<Vec<IdentifierValue>> {
    let session = db.session();
    let entity = &mapped.mapping.entity;
    let insert_sql = insert.map(|delegate| {
        delegate
            .prepare_identifier_generating_insert()
            .set_table_name(mapped.descriptor.table_name())
            .add_identity_column(mapped.mapping.identifier_column.as_str())
            .add_columns(
                mapped
                    .descriptor
                    .properties()
                    .iter()
                    .flat_map(|p| p.columns().iter().cloned()),
            )
            .to_statement_string()
    });

    let mut ids = Vec::with_capacity(count);
    for n in 0..count {
        let mut record = Record::new(entity.as_str());
        let mut params = Vec::new();
        for property in mapped.descriptor.properties() {
            let value = SqlValue::Text(format!("{}-{worker}-{n}", property.name()));
            params.extend(property.columns().iter().map(|_| value.clone()));
            record = record.with_property(property.name(), value);
        }

        let outcome = mapped
            .generator
            .generate(&session, &record)
            .with_context(|| format!("could not generate an identifier for [{entity}]"))?;
        let id = match (outcome, insert, insert_sql.as_deref()) {
            (GenerationOutcome::Value(id), _, _) => id,
            (GenerationOutcome::DeferToInsert, Some(delegate), Some(sql)) => {
                delegate.perform_insert(&session, sql, &params, &record)?
            }
            (GenerationOutcome::DeferToInsert, _, _) => {
                bail!("[{entity}] defers to the insert but its generator has no insert delegate")
            }
            (GenerationOutcome::DeferToAssociation, _, _) => {
                bail!("[{entity}] takes its identifier from an association")
            }
        };
        ids.push(id);
    }
    Ok(ids)
}
