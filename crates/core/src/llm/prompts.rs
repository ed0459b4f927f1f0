use crate::domain::recommendation::StockData;
use crate::llm::CompletionRequest;

fn discovery_system_prompt() -> String {
    [
        "You are a top stock analyst specializing in small-cap stocks.",
        "Your job is to identify the single most promising small-cap stock (market cap under $2B)",
        "that shows the highest potential for significant growth.",
    ]
    .join(" ")
}

fn discovery_user_prompt() -> String {
    [
        "Based on current market conditions, identify the ONE most promising small-cap stock",
        "that you believe has the highest potential for growth in the near term.",
        "Provide: 1) Stock symbol, 2) Company name, 3) Detailed reasoning why this is your top pick.",
        "Write the symbol on its own line as \"Symbol: XXXX\".",
        "Focus on stocks with strong fundamentals, recent positive developments, or emerging trends.",
        "Be specific and thorough in your analysis.",
    ]
    .join(" ")
}

pub fn discovery_request(max_tokens: u32) -> CompletionRequest {
    CompletionRequest {
        system: discovery_system_prompt(),
        user: discovery_user_prompt(),
        max_tokens,
    }
}

pub fn analysis_prompt(stock: &StockData) -> String {
    let price = stock
        .price
        .map(|p| format!("${}", p.price))
        .unwrap_or_else(|| "N/A".to_string());
    let change = stock
        .price
        .and_then(|p| p.change_percentage)
        .map(|c| format!("{c}%"))
        .unwrap_or_else(|| "N/A".to_string());
    let news = if stock.headlines.is_empty() {
        "No recent news".to_string()
    } else {
        stock.headlines.join("; ")
    };

    format!(
        "You are a top stock analyst. Based on the following discovered small-cap stock with its \
current price, daily change, and recent news headlines, provide a detailed analysis \
of this stock's potential for significant growth:\n\n\
Stock: {symbol}\n\
Current Price: {price}\n\
Daily Change: {change}\n\
Recent News: {news}\n\n\
Provide a comprehensive analysis including:\n\
1. Why this stock shows promise\n\
2. Key factors driving its potential\n\
3. Risk considerations\n\
4. Your overall recommendation",
        symbol = stock.symbol,
    )
}

pub fn analysis_request(stock: &StockData, max_tokens: u32) -> CompletionRequest {
    CompletionRequest {
        system: "You are a helpful stock analyst.".to_string(),
        user: analysis_prompt(stock),
        max_tokens,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recommendation::PriceSnapshot;

    fn stock(price: Option<PriceSnapshot>, headlines: &[&str]) -> StockData {
        StockData {
            symbol: "TICK".parse().unwrap(),
            price,
            headlines: headlines.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn discovery_asks_for_one_small_cap_pick() {
        let req = discovery_request(1000);
        assert_eq!(req.max_tokens, 1000);
        assert!(req.system.contains("under $2B"));
        assert!(req.user.contains("ONE most promising small-cap stock"));
        assert!(req.user.contains("Symbol: XXXX"));
    }

    #[test]
    fn analysis_embeds_price_change_and_headlines() {
        let s = stock(
            Some(PriceSnapshot {
                price: 142.37,
                change_percentage: Some(-1.5),
            }),
            &["Company X announces partnership", "Analyst upgrades TICK to buy"],
        );
        let prompt = analysis_prompt(&s);
        assert!(prompt.contains("Stock: TICK\n"));
        assert!(prompt.contains("Current Price: $142.37\n"));
        assert!(prompt.contains("Daily Change: -1.5%\n"));
        assert!(prompt.contains(
            "Recent News: Company X announces partnership; Analyst upgrades TICK to buy\n"
        ));
        assert!(prompt.ends_with("4. Your overall recommendation"));
    }

    #[test]
    fn analysis_marks_missing_data() {
        let prompt = analysis_prompt(&stock(None, &[]));
        assert!(prompt.contains("Current Price: N/A\n"));
        assert!(prompt.contains("Daily Change: N/A\n"));
        assert!(prompt.contains("Recent News: No recent news\n"));

        let req = analysis_request(
            &stock(
                Some(PriceSnapshot {
                    price: 3.0,
                    change_percentage: None,
                }),
                &[],
            ),
            500,
        );
        assert_eq!(req.system, "You are a helpful stock analyst.");
        assert_eq!(req.max_tokens, 500);
        assert!(req.user.contains("Current Price: $3\n"));
        assert!(req.user.contains("Daily Change: N/A\n"));
    }
}
