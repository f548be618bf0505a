pub mod rice_price_sync;
