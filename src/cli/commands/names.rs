use anyhow::Result;
use clap::{Args, ValueEnum};
use datavault::naming::{EntityDescriptor, EntityKind, StoredProcedure, lookup_table_name};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    Hub,
    Link,
}

impl From<KindArg> for EntityKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Hub => EntityKind::Hub,
            KindArg::Link => EntityKind::Link,
        }
    }
}

#[derive(Args)]
pub struct NamesArgs {
    /// Declared entity type name, e.g. DvCustomer
    pub type_name: String,
    /// Entity kind
    #[arg(short, long, value_enum, default_value = "hub")]
    pub kind: KindArg,
}

#[derive(Args)]
pub struct LookupTableArgs {
    /// Lookup type name, e.g. CountryCode
    pub type_name: String,
}

pub fn names_command(args: NamesArgs) -> Result<()> {
    let descriptor = EntityDescriptor::new(args.kind.into(), &args.type_name);

    println!("Entity:     {} ({})", descriptor.type_name, descriptor.kind);
    println!("Short name: {}", descriptor.short_name);
    println!("Table:      {}", descriptor.table_name);
    println!("PK column:  {}", descriptor.pk_column);
    if let Some(bk_column) = &descriptor.bk_column {
        println!("BK column:  {}", bk_column);
    }
    println!("Sequence:   {}", descriptor.sequence_name);

    println!();
    println!("Procedures:");
    for procedure in procedures_for(descriptor.kind) {
        println!("  {}", descriptor.procedure(*procedure));
    }
    println!("  {}", StoredProcedure::ReadView.for_entity(&descriptor.short_name));

    Ok(())
}

fn procedures_for(kind: EntityKind) -> &'static [StoredProcedure] {
    match kind {
        EntityKind::Hub => &[
            StoredProcedure::ReadRecord,
            StoredProcedure::ReadRecords,
            StoredProcedure::CreateRecord,
            StoredProcedure::UpdateRecord,
            StoredProcedure::DeleteRecord,
        ],
        EntityKind::Link => &[
            StoredProcedure::ReadLinks,
            StoredProcedure::LinkRecord,
            StoredProcedure::UpdateLink,
            StoredProcedure::UnLinkRecord,
        ],
    }
}

pub fn lookup_table_command(args: LookupTableArgs) -> Result<()> {
    println!("{}", lookup_table_name(&args.type_name));
    Ok(())
}
