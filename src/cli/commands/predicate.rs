use anyhow::{Result, anyhow, bail};
use clap::Args;
use datavault::query::{PredicateBuilder, QueryField, QueryOperator, QueryValue};

#[derive(Args)]
pub struct PredicateArgs {
    /// Table name (omit for an unqualified column)
    #[arg(short, long)]
    pub table: Option<String>,
    /// Column name
    #[arg(short, long)]
    pub field: String,
    /// Operator: =, !=, <, <=, >, >=, like, in, null (or eq, ne, lt, ...)
    #[arg(short, long, default_value = "=")]
    pub op: String,
    /// Value; repeat for IN
    #[arg(short, long = "value")]
    pub values: Vec<String>,
    /// Treat the value as hex and wrap it in UNHEX()
    #[arg(long)]
    pub hex: bool,
}

pub fn predicate_command(args: PredicateArgs) -> Result<()> {
    let operator: QueryOperator = args.op.parse().map_err(|e: String| anyhow!(e))?;
    let field = match &args.table {
        Some(table) => QueryField::new(table.as_str(), args.field.as_str()),
        None => QueryField::column(args.field.as_str()),
    };

    let value = predicate_value(operator, &args.values, args.hex)?;
    println!("{}", PredicateBuilder::new(field, operator, value).build());
    Ok(())
}

fn predicate_value(operator: QueryOperator, values: &[String], hex: bool) -> Result<QueryValue> {
    match operator {
        QueryOperator::Null => Ok(QueryValue::Null),
        QueryOperator::In => {
            if values.is_empty() {
                bail!("IN needs at least one --value");
            }
            Ok(QueryValue::List(values.to_vec()))
        }
        _ => match values {
            [value] if hex => Ok(QueryValue::unhex(value)),
            [value] => Ok(scalar(value)),
            [] => bail!("Operator {} needs a --value", operator),
            _ => bail!("Operator {} takes a single --value", operator),
        },
    }
}

fn scalar(raw: &str) -> QueryValue {
    if let Ok(i) = raw.parse::<i64>() {
        return QueryValue::Integer(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        return QueryValue::Float(f);
    }
    match raw {
        "true" => QueryValue::Bool(true),
        "false" => QueryValue::Bool(false),
        _ => QueryValue::Text(raw.to_string()),
    }
}
