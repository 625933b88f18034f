//! Response text for the data agent.
//!
//! Live answers summarise fetched rows. Fallback answers are pre-written
//! paragraphs used when the source is unavailable; each ends with a pointer
//! to abs.gov.au.

use chrono::Utc;

use crate::query::{Intent, Region};
use crate::sources::Observation;

/// Answer for an economic query whose fetch came back empty.
pub const ECONOMIC_UNAVAILABLE: &str =
    "Unable to retrieve economic indicator data. The ABS API may be temporarily unavailable.";

const SOURCE_POINTER: &str = "For current official statistics, visit abs.gov.au";

/// "New South Wales (NSW)", or "Australia" for national queries.
pub fn location(region: Option<Region>) -> String {
    match region {
        Some(r) => format!("{} ({})", r.name(), r.code().to_uppercase()),
        None => "Australia".to_string(),
    }
}

// ============================================================================
// Live data
// ============================================================================

/// Summarise fetched rows for an intent.
pub fn live_response(intent: Intent, region: Option<Region>, rows: &[Observation]) -> String {
    let place = location(region);

    let (header, topic, summary) = match intent {
        Intent::Population => (
            format!("Based on the latest ABS data, here's the population information for {place}:"),
            "population data",
            "Estimated resident population by quarter",
        ),
        Intent::Employment => (
            format!("Based on the latest ABS Labour Force data for {place}:"),
            "employment statistics",
            "Includes unemployment rate, participation rate, and employment growth",
        ),
        Intent::Housing => (
            format!("Based on the latest ABS building approvals and housing data for {place}:"),
            "housing trend analysis",
            "Includes building approvals, construction activity, and price trends",
        ),
        _ => (
            format!("Based on the latest ABS Consumer Price Index data for {place}:"),
            "Consumer Price Index data",
            "Includes inflation trends and price movement analysis",
        ),
    };

    let mut text = format!("{header}\n\nLatest {topic} for {place}:\n");
    text.push_str(&format!("• Data points available: {}\n", rows.len()));
    if let Some((period, value)) = latest(rows) {
        text.push_str(&format!("• Latest period: {period} (value {value})\n"));
    }
    text.push_str(&format!(
        "• Last updated: {}\n• {summary}\n\n{SOURCE_POINTER}",
        Utc::now().format("%Y-%m-%d")
    ));
    text
}

/// Most recent period that carries a value.
fn latest(rows: &[Observation]) -> Option<(&str, f64)> {
    rows.iter()
        .filter_map(|row| Some((row.period()?, row.value?)))
        .max_by(|a, b| a.0.cmp(b.0))
}

// ============================================================================
// Fallback text
// ============================================================================

/// Static answer for an intent when live data is unavailable.
pub fn fallback_response(intent: Intent, region: Option<Region>) -> String {
    match intent {
        Intent::Population => population_fallback(region),
        Intent::Employment => employment_fallback(region),
        Intent::Housing => housing_fallback(region),
        Intent::EconomicIndicator => ECONOMIC_UNAVAILABLE.to_string(),
        _ => capabilities(),
    }
}

/// What the service can answer.
pub fn capabilities() -> String {
    "I can help you with Australian Bureau of Statistics data including:\n\
     • Population statistics by state and territory\n\
     • Employment and unemployment data\n\
     • Housing and building approval trends\n\
     • Consumer Price Index and inflation data\n\n\
     Please specify what type of data you're looking for."
        .to_string()
}

fn population_fallback(region: Option<Region>) -> String {
    match region {
        Some(Region::Nsw) => format!(
            "Based on recent ABS data for New South Wales:\n\n\
             • Population: Approximately 8.2 million residents (as of 2024)\n\
             • Growth rate: Around 1.2% annually\n\
             • Largest city: Sydney (5.3+ million)\n\
             • Key demographics: Diverse multicultural population\n\
             • Regional distribution: 75% in Greater Sydney area\n\n\
             NSW remains Australia's most populous state, accounting for about 32% of the national population.\n\n\
             {SOURCE_POINTER}"
        ),
        Some(region) => format!(
            "I can provide general population information for {}:\n\n{}\n\n{SOURCE_POINTER}",
            location(Some(region)),
            state_population(region)
        ),
        None => format!(
            "Australia's Population Overview (based on recent ABS data):\n\n\
             • Total population: Approximately 26.6 million (2024)\n\
             • Growth rate: 1.0-1.5% annually\n\
             • Major cities: Sydney (5.3M), Melbourne (5.2M), Brisbane (2.6M)\n\
             • States by population: NSW (8.2M), VIC (6.7M), QLD (5.4M)\n\
             • Immigration: Significant contributor to growth\n\
             • Median age: Around 38 years\n\n\
             {SOURCE_POINTER}"
        ),
    }
}

fn state_population(region: Region) -> &'static str {
    match region {
        Region::Vic => "• Population: Approximately 6.7 million residents\n• Capital: Melbourne (5.2+ million)\n• Growth rate: Around 1.8% annually\n• Known for: Cultural diversity, coffee culture",
        Region::Qld => "• Population: Approximately 5.4 million residents\n• Capital: Brisbane (2.6+ million)\n• Growth rate: Around 1.5% annually\n• Known for: Tourism, mining, tropical climate",
        Region::Sa => "• Population: Approximately 1.8 million residents\n• Capital: Adelaide (1.4+ million)\n• Growth rate: Around 0.8% annually\n• Known for: Wine regions, festivals",
        Region::Wa => "• Population: Approximately 2.8 million residents\n• Capital: Perth (2.1+ million)\n• Growth rate: Around 1.2% annually\n• Known for: Mining industry, beaches",
        Region::Tas => "• Population: Approximately 570,000 residents\n• Capital: Hobart (250,000+)\n• Growth rate: Around 0.5% annually\n• Known for: Natural beauty, MONA",
        Region::Nt => "• Population: Approximately 250,000 residents\n• Capital: Darwin (150,000+)\n• Growth rate: Around 0.3% annually\n• Known for: Indigenous culture, Uluru",
        Region::Act => "• Population: Approximately 460,000 residents\n• Capital: Canberra (460,000+)\n• Growth rate: Around 1.1% annually\n• Known for: Government, universities",
        Region::Nsw => "• Population: Approximately 8.2 million residents\n• Capital: Sydney (5.3+ million)\n• Growth rate: Around 1.2% annually",
    }
}

fn employment_fallback(region: Option<Region>) -> String {
    let highlight = match region {
        Some(Region::Nsw) => "• NSW: 4.1M employed (unemployment 3.6%)\n\n",
        Some(Region::Vic) => "• VIC: 3.4M employed (unemployment 3.8%)\n\n",
        Some(Region::Qld) => "• QLD: 2.7M employed (unemployment 3.9%)\n\n",
        _ => "",
    };

    format!(
        "Australia Employment Statistics Overview (based on recent ABS data):\n\n\
         {highlight}\
         Key Employment Indicators:\n\
         • Unemployment rate: 3.7% (historically low)\n\
         • Labour force participation: 66.8%\n\
         • Employment-to-population ratio: 64.4%\n\
         • Total employed: ~13.9 million people\n\n\
         Employment Growth:\n\
         • Annual employment growth: 2.1%\n\
         • Full-time employment: ~9.6 million\n\
         • Part-time employment: ~4.3 million\n\n\
         Major Employment Sectors:\n\
         • Healthcare & Social Assistance: 1.8M jobs\n\
         • Retail Trade: 1.3M jobs\n\
         • Construction: 1.2M jobs\n\
         • Professional Services: 1.1M jobs\n\
         • Education & Training: 1.0M jobs\n\n\
         Regional Variations:\n\
         • NSW: 4.1M employed (unemployment 3.6%)\n\
         • VIC: 3.4M employed (unemployment 3.8%)\n\
         • QLD: 2.7M employed (unemployment 3.9%)\n\n\
         For current official statistics, visit abs.gov.au/labour-force"
    )
}

fn housing_fallback(region: Option<Region>) -> String {
    let highlight = match region {
        Some(Region::Nsw) => "• Sydney: Median house price ~$1.4M (moderate growth)\n\n",
        Some(Region::Vic) => "• Melbourne: Median house price ~$1.0M (steady growth)\n\n",
        Some(Region::Qld) => "• Brisbane: Median house price ~$800K (strong growth)\n\n",
        Some(Region::Wa) => "• Perth: Median house price ~$650K (recovering)\n\n",
        Some(Region::Sa) => "• Adelaide: Median house price ~$700K (solid growth)\n\n",
        _ => "",
    };

    format!(
        "Australia Housing Market Analysis (based on recent data):\n\n\
         {highlight}\
         Building Approvals & Construction:\n\
         • Monthly building approvals: ~15,000-17,000 dwellings\n\
         • Annual approvals: ~180,000-200,000 dwellings\n\
         • Houses vs Apartments: 60% houses, 40% apartments\n\
         • Construction value: $150-170 billion annually\n\n\
         Price Trends by Capital City:\n\
         • Sydney: Median house price ~$1.4M (moderate growth)\n\
         • Melbourne: Median house price ~$1.0M (steady growth)\n\
         • Brisbane: Median house price ~$800K (strong growth)\n\
         • Perth: Median house price ~$650K (recovering)\n\
         • Adelaide: Median house price ~$700K (solid growth)\n\n\
         Regional Housing:\n\
         • Regional areas showing 10-15% annual growth\n\
         • Sea change/tree change trend continues\n\
         • Infrastructure investment driving growth\n\n\
         Market Factors:\n\
         • Interest rates: Key driver of market activity\n\
         • First home buyer schemes: Supporting entry\n\
         • Population growth: Sustaining demand\n\
         • Supply constraints: Affecting affordability\n\n\
         For current official housing statistics, visit abs.gov.au/building-approvals"
    )
}
