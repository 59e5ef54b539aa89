//! Settings command implementation.

use anyhow::Result;

use crate::args::OutputFormatArg;
use crate::config_context::ConfigContext;
use crate::formatters::{format_properties, redact_properties};

pub fn run(context: &ConfigContext, output: OutputFormatArg) -> Result<()> {
    let properties = context.setup.settings.to_properties(&context.prefix);
    let properties = redact_properties(properties, &context.prefix);
    print!("{}", format_properties(&properties, output)?);
    Ok(())
}
