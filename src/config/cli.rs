use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;

/// Asks for whichever query fields were not given on the command line or in
/// the config file.
pub fn prompt_missing_query(
    business: Option<String>,
    area: Option<String>,
) -> anyhow::Result<(String, String)> {
    let theme = ColorfulTheme::default();

    let area = match area {
        Some(area) => area,
        None => Input::<String>::with_theme(&theme)
            .with_prompt("What area would you like data from?")
            .interact_text()?,
    };

    let business = match business {
        Some(business) => business,
        None => Input::<String>::with_theme(&theme)
            .with_prompt("What type of business are you looking for?")
            .interact_text()?,
    };

    Ok((business, area))
}
