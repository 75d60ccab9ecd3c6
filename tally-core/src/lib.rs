//! tally-core: shared transaction types and time helpers

pub mod finance;
pub mod time;

pub use finance::{Category, Direction, TransactionCandidate, RAW_LINE_MAX_CHARS};

/// Keyword categorization of transaction descriptions
pub mod categorizer {
    use super::Category;

    /// Ordered keyword table; the first row with a hit wins.
    pub const KEYWORD_RULES: &[(&[&str], Category)] = &[
        (
            &[
                "restaurant", "rest", "food", "uber eats", "rappi", "starbucks", "cafe",
                "cafeteria", "super", "supermarket", "tienda", "comida", "taqueria", "burger",
                "pizza", "dominos", "little caesars", "bross", "capitako", "farmacia",
                "oxxo", "7-eleven", "soriana", "walmart", "chedraui", "comercial mexicana",
            ],
            Category::Food,
        ),
        (
            &[
                "uber", "taxi", "gasolina", "gas", "metro", "transporte", "parking",
                "estacionamiento", "didi", "cabify", "viaje", "viajes",
            ],
            Category::Transportation,
        ),
        (
            &[
                "netflix", "spotify", "amazon prime", "renta", "rent", "luz", "electric",
                "agua", "water", "internet", "phone", "telefono", "telcel", "movistar", "at&t",
                "spei enviado", "conekta", "subscription", "suscripcion", "pago", "payment",
            ],
            Category::PaymentsRecurring,
        ),
        (
            &[
                "cine", "movie", "theater", "teatro", "concert", "concierto", "game", "juego",
                "tickets", "evento", "event",
            ],
            Category::Entertainment,
        ),
    ];

    /// Categorize a description by keyword. Pure: same text, same answer.
    pub fn categorize(description: &str) -> Category {
        let desc = description.to_lowercase();
        KEYWORD_RULES
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| desc.contains(k)))
            .map(|(_, category)| *category)
            .unwrap_or_default()
    }

}

pub use categorizer::categorize;
