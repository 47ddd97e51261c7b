//! Balance CLI command

use crate::config::settings::Settings;
use crate::display::format_balance_list;
use crate::error::TallyResult;
use crate::services::BalanceService;
use crate::storage::Storage;

/// Print cached balances; `all` includes retired payment methods
pub fn handle_balance_command(
    storage: &Storage,
    settings: &Settings,
    all: bool,
) -> TallyResult<()> {
    let list = BalanceService::new(storage).list(all)?;
    print!("{}", format_balance_list(&list, settings));
    Ok(())
}
