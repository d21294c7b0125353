//! Command execution implementations

use super::Commands;
use super::definitions::{FunctionMapCommands, MessageCommands, SarcCommands, UmsbtCommands};
use super::messages::MessageFormat;
use super::{convert, function_map, info, messages, sarc, umsbt};
use crate::config::Settings;

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying command fails.
    pub fn execute(&self, settings: &Settings) -> anyhow::Result<()> {
        match self {
            Commands::Info { file } => info::execute(file, settings),
            Commands::Msbt { command } => command.execute(MessageFormat::Msbt, settings),
            Commands::Bmg { command } => command.execute(MessageFormat::Bmg, settings),
            Commands::Sarc { command } => command.execute(settings),
            Commands::Umsbt { command } => command.execute(settings),
            Commands::FunctionMap { command } => command.execute(),
            Commands::Convert {
                source,
                destination,
                map,
                quiet,
            } => convert::execute(source, destination.as_deref(), map.as_deref(), *quiet, settings),
        }
    }
}

impl MessageCommands {
    /// Execute the selected message command.
    ///
    /// # Errors
    /// Returns an error if the file cannot be converted.
    pub fn execute(&self, format: MessageFormat, settings: &Settings) -> anyhow::Result<()> {
        match self {
            MessageCommands::Export {
                source,
                destination,
                map,
            } => messages::export(format, source, destination.as_deref(), map.as_deref(), settings),
            MessageCommands::Import {
                source,
                destination,
                map,
                compress,
            } => messages::import(
                format,
                source,
                destination.as_deref(),
                map.as_deref(),
                *compress,
                settings,
            ),
        }
    }
}

impl SarcCommands {
    /// Execute the selected SARC command.
    ///
    /// # Errors
    /// Returns an error if the underlying archive operation fails.
    pub fn execute(&self, settings: &Settings) -> anyhow::Result<()> {
        match self {
            SarcCommands::List { source } => sarc::list(source, settings),
            SarcCommands::Extract {
                source,
                destination,
                quiet,
            } => sarc::extract(source, destination, *quiet, settings),
            SarcCommands::Pack {
                source,
                destination,
                big_endian,
                compress,
            } => sarc::pack(source, destination, *big_endian, *compress, settings),
        }
    }
}

impl UmsbtCommands {
    /// Execute the selected UMSBT command.
    ///
    /// # Errors
    /// Returns an error if the underlying bundle operation fails.
    pub fn execute(&self, settings: &Settings) -> anyhow::Result<()> {
        match self {
            UmsbtCommands::Extract {
                source,
                destination,
            } => umsbt::extract(source, destination, settings),
            UmsbtCommands::Pack { sources, output } => umsbt::pack(sources, output),
        }
    }
}

impl FunctionMapCommands {
    /// Execute the selected function map command.
    ///
    /// # Errors
    /// Returns an error if the map cannot be read or compiled.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            FunctionMapCommands::Check { file } => function_map::check(file),
        }
    }
}
