//! Normalization of OKCoin v1 payloads into the canonical types.
//!
//! Every entry point checks `error_code` first. Lists are converted element by
//! element: an element with the wrong outer shape or without its identifier
//! fails the whole call, an element with another bad field is logged and
//! skipped. Only order status and side fall back to a default for
//! unrecognized codes.

use crate::core::errors::ExchangeError;
use crate::core::types::{
    conversion, Account, Currency, CurrencyPair, Depth, DepthRecord, Kline, Order, OrderSide,
    OrderStatus, SubAccount, Ticker, Trade, TradeSide,
};
use chrono::{DateTime, TimeZone, Timelike};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::warn;

/// Native `status` codes of `order_info.do` / `order_history.do`
pub const ORDER_STATUS_CODES: &[(i64, OrderStatus)] = &[
    (-1, OrderStatus::Cancelled),
    (0, OrderStatus::Unfinished),
    (1, OrderStatus::PartFinished),
    (2, OrderStatus::Finished),
    (4, OrderStatus::Cancelling),
];

/// Native `type` codes of orders
pub const ORDER_SIDE_CODES: &[(&str, OrderSide)] = &[
    ("buy", OrderSide::Buy),
    ("sell", OrderSide::Sell),
    ("buy_market", OrderSide::BuyMarket),
    ("sell_market", OrderSide::SellMarket),
];

const ERROR_CODE_DESCRIPTIONS: &[(i64, &str)] = &[
    (10000, "Required field can not be null"),
    (10001, "Request frequency too high"),
    (10002, "System error"),
    (10004, "Request failed"),
    (10005, "SecretKey does not exist"),
    (10006, "Api_key does not exist"),
    (10007, "Signature does not match"),
    (10008, "Illegal parameter"),
    (10009, "Order does not exist"),
    (10010, "Insufficient funds"),
    (10011, "Amount too low"),
    (10014, "Order price must be between 0 and 1,000,000"),
    (10016, "Insufficient coins balance"),
    (10024, "Balance not sufficient"),
];

pub fn order_status_from_code(code: i64) -> OrderStatus {
    ORDER_STATUS_CODES
        .iter()
        .find(|(native, _)| *native == code)
        .map(|(_, status)| *status)
        .unwrap_or_default()
}

pub fn order_side_from_code(code: &str) -> OrderSide {
    ORDER_SIDE_CODES
        .iter()
        .find(|(native, _)| *native == code)
        .map(|(_, side)| *side)
        .unwrap_or_default()
}

pub fn describe_error_code(code: i64) -> &'static str {
    ERROR_CODE_DESCRIPTIONS
        .iter()
        .find(|(known, _)| *known == code)
        .map_or("Exchange rejected the request", |(_, text)| *text)
}

/// Fail with the exchange's code when the payload carries a numeric `error_code`
pub fn check_error_code(value: &Value) -> Result<(), ExchangeError> {
    match value.get("error_code") {
        Some(Value::Number(code)) => {
            let code = code
                .as_i64()
                .or_else(|| code.as_f64().map(|f| f as i64))
                .unwrap_or_default();
            Err(ExchangeError::ApiError {
                code,
                message: describe_error_code(code).to_string(),
            })
        }
        _ => Ok(()),
    }
}

fn malformed(message: impl Into<String>) -> ExchangeError {
    ExchangeError::InvalidResponseFormat(message.into())
}

fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>, ExchangeError> {
    value
        .as_object()
        .ok_or_else(|| malformed(format!("{} is not an object: {}", what, value)))
}

fn as_array<'a>(value: &'a Value, what: &str) -> Result<&'a Vec<Value>, ExchangeError> {
    value
        .as_array()
        .ok_or_else(|| malformed(format!("{} is not an array: {}", what, value)))
}

fn field<'a>(object: &'a Map<String, Value>, key: &str) -> Result<&'a Value, ExchangeError> {
    object
        .get(key)
        .ok_or_else(|| malformed(format!("missing field `{}`", key)))
}

fn f64_field(object: &Map<String, Value>, key: &str) -> Result<f64, ExchangeError> {
    let value = field(object, key)?;
    conversion::value_to_f64(value)
        .ok_or_else(|| malformed(format!("field `{}` is not numeric: {}", key, value)))
}

fn i64_field(object: &Map<String, Value>, key: &str) -> Result<i64, ExchangeError> {
    let value = field(object, key)?;
    conversion::value_to_i64(value)
        .ok_or_else(|| malformed(format!("field `{}` is not an integer: {}", key, value)))
}

fn f64_at(row: &[Value], index: usize) -> Result<f64, ExchangeError> {
    row.get(index)
        .and_then(conversion::value_to_f64)
        .ok_or_else(|| malformed(format!("position {} is missing or not numeric", index)))
}

fn i64_at(row: &[Value], index: usize) -> Result<i64, ExchangeError> {
    row.get(index)
        .and_then(conversion::value_to_i64)
        .ok_or_else(|| malformed(format!("position {} is missing or not an integer", index)))
}

pub fn parse_ticker(value: &Value) -> Result<Ticker, ExchangeError> {
    check_error_code(value)?;
    let body = as_object(value, "ticker response")?;
    let ticker = as_object(field(body, "ticker")?, "ticker")?;

    let date = field(body, "date")?;
    let date = conversion::value_to_u64(date)
        .ok_or_else(|| malformed(format!("field `date` is not a timestamp: {}", date)))?;

    Ok(Ticker {
        date,
        last: f64_field(ticker, "last")?,
        buy: f64_field(ticker, "buy")?,
        sell: f64_field(ticker, "sell")?,
        low: f64_field(ticker, "low")?,
        high: f64_field(ticker, "high")?,
        vol: f64_field(ticker, "vol")?,
    })
}

/// Convert `[[price, amount], ...]` keeping the exchange's ordering
pub fn parse_depth_levels(levels: &Value) -> Result<Vec<DepthRecord>, ExchangeError> {
    let levels = as_array(levels, "depth side")?;
    let mut records = Vec::with_capacity(levels.len());

    for level in levels {
        let row = as_array(level, "depth level")?;
        match (f64_at(row, 0), f64_at(row, 1)) {
            (Ok(price), Ok(amount)) => records.push(DepthRecord { price, amount }),
            (Err(e), _) | (_, Err(e)) => warn!("Skipping depth level {}: {}", level, e),
        }
    }

    Ok(records)
}

pub fn parse_depth(value: &Value) -> Result<Depth, ExchangeError> {
    check_error_code(value)?;
    let body = as_object(value, "depth response")?;

    Ok(Depth {
        ask_list: parse_depth_levels(field(body, "asks")?)?,
        bid_list: parse_depth_levels(field(body, "bids")?)?,
    })
}

/// Depth carried by a stream frame; a side the frame leaves out is empty
pub fn parse_stream_depth(data: &Value) -> Result<Depth, ExchangeError> {
    check_error_code(data)?;
    let data = as_object(data, "depth frame data")?;

    let side = |key: &str| {
        data.get(key)
            .map_or_else(|| Ok(Vec::new()), parse_depth_levels)
    };

    Ok(Depth {
        ask_list: side("asks")?,
        bid_list: side("bids")?,
    })
}

fn parse_trade_object(trade: &Map<String, Value>) -> Result<Trade, ExchangeError> {
    let date = match trade.get("date_ms").and_then(conversion::value_to_i64) {
        Some(ms) => ms,
        None => i64_field(trade, "date")? * 1000,
    };

    let trade_type = field(trade, "type")?
        .as_str()
        .ok_or_else(|| malformed("field `type` is not a string"))?
        .to_string();

    Ok(Trade {
        tid: i64_field(trade, "tid")?,
        price: f64_field(trade, "price")?,
        amount: f64_field(trade, "amount")?,
        date,
        trade_type,
    })
}

/// Trades from `trades.do` or `trade_history.do`
pub fn parse_trades(value: &Value) -> Result<Vec<Trade>, ExchangeError> {
    check_error_code(value)?;
    let rows = as_array(value, "trades response")?;
    let mut trades = Vec::with_capacity(rows.len());

    for row in rows {
        let object = as_object(row, "trade")?;
        match parse_trade_object(object) {
            Ok(trade) => trades.push(trade),
            Err(e) => warn!("Skipping trade {}: {}", row, e),
        }
    }

    Ok(trades)
}

fn parse_kline_row(row: &[Value]) -> Result<Kline, ExchangeError> {
    Ok(Kline {
        timestamp: i64_at(row, 0)? / 1000,
        open: f64_at(row, 1)?,
        high: f64_at(row, 2)?,
        low: f64_at(row, 3)?,
        close: f64_at(row, 4)?,
        vol: f64_at(row, 5)?,
    })
}

/// Rows of `[timestamp_ms, open, high, low, close, volume, ...]`
pub fn parse_klines(value: &Value) -> Result<Vec<Kline>, ExchangeError> {
    check_error_code(value)?;
    let rows = as_array(value, "kline response")?;
    let mut klines = Vec::with_capacity(rows.len());

    for row in rows {
        let columns = as_array(row, "kline row")?;
        match parse_kline_row(columns) {
            Ok(kline) => klines.push(kline),
            Err(e) => warn!("Skipping kline row {}: {}", row, e),
        }
    }

    Ok(klines)
}

fn parse_order_object(
    order: &Map<String, Value>,
    order_id: i64,
    pair: &CurrencyPair,
) -> Result<Order, ExchangeError> {
    let status = order
        .get("status")
        .and_then(conversion::value_to_i64)
        .map(order_status_from_code)
        .unwrap_or_default();
    let side = order
        .get("type")
        .and_then(Value::as_str)
        .map(order_side_from_code)
        .unwrap_or_default();

    Ok(Order {
        order_id,
        price: f64_field(order, "price")?,
        amount: f64_field(order, "amount")?,
        deal_amount: f64_field(order, "deal_amount")?,
        avg_price: f64_field(order, "avg_price")?,
        // create_date is in milliseconds
        order_time: i64_field(order, "create_date")? / 1000,
        currency: pair.clone(),
        status,
        side,
    })
}

/// Orders from `order_info.do` or `order_history.do`
///
/// An order without a usable `order_id` fails the call; any other bad field
/// only drops that order.
pub fn parse_orders(value: &Value, pair: &CurrencyPair) -> Result<Vec<Order>, ExchangeError> {
    check_error_code(value)?;
    let body = as_object(value, "orders response")?;
    let rows = as_array(field(body, "orders")?, "orders")?;
    let mut orders = Vec::with_capacity(rows.len());

    for row in rows {
        let object = as_object(row, "order")?;
        let order_id = i64_field(object, "order_id")?;
        match parse_order_object(object, order_id, pair) {
            Ok(order) => orders.push(order),
            Err(e) => warn!(order_id, "Skipping order {}: {}", row, e),
        }
    }

    Ok(orders)
}

/// Order echoed back from a successful `trade.do` call
pub fn parse_placed_order(
    value: &Value,
    side: TradeSide,
    amount: f64,
    price: f64,
    pair: &CurrencyPair,
) -> Result<Order, ExchangeError> {
    check_error_code(value)?;
    let body = as_object(value, "trade response")?;

    Ok(Order {
        order_id: i64_field(body, "order_id")?,
        price,
        amount,
        deal_amount: 0.0,
        avg_price: 0.0,
        order_time: 0,
        currency: pair.clone(),
        status: OrderStatus::Unfinished,
        side: order_side_from_code(side.as_str()),
    })
}

pub fn parse_cancel(value: &Value) -> Result<bool, ExchangeError> {
    check_error_code(value)?;
    let body = as_object(value, "cancel response")?;
    Ok(body.get("result").and_then(Value::as_bool).unwrap_or(true))
}

pub fn parse_account(value: &Value, exchange: &str) -> Result<Account, ExchangeError> {
    check_error_code(value)?;
    let body = as_object(value, "userinfo response")?;
    let info = body
        .get("info")
        .and_then(Value::as_object)
        .ok_or_else(|| malformed(format!("missing account info: {}", value)))?;

    let funds = as_object(field(info, "funds")?, "funds")?;
    let asset = as_object(field(funds, "asset")?, "funds.asset")?;
    let free = as_object(field(funds, "free")?, "funds.free")?;
    let freezed = as_object(field(funds, "freezed")?, "funds.freezed")?;

    let mut sub_accounts = HashMap::with_capacity(free.len());
    for (code, free_amount) in free {
        let sub_account = Currency::new(code)
            .map_err(|e| malformed(e.to_string()))
            .and_then(|currency| {
                Ok(SubAccount {
                    amount: conversion::value_to_f64(free_amount).ok_or_else(|| {
                        malformed(format!("free balance is not numeric: {}", free_amount))
                    })?,
                    frozen_amount: f64_field(freezed, code)?,
                    loan_amount: 0.0,
                    currency,
                })
            });

        match sub_account {
            Ok(sub_account) => {
                sub_accounts.insert(sub_account.currency.clone(), sub_account);
            }
            Err(e) => warn!("Skipping balance for {}: {}", code, e),
        }
    }

    Ok(Account {
        exchange: exchange.to_string(),
        asset: f64_field(asset, "total")?,
        net_asset: f64_field(asset, "net")?,
        sub_accounts,
    })
}

fn parse_time_of_day(text: &str) -> Option<(u32, u32, u32)> {
    let mut parts = text.trim().split(':').map(|p| p.parse::<u32>().ok());
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(Some(h)), Some(Some(m)), Some(Some(s)), None) => Some((h, m, s)),
        _ => None,
    }
}

/// Attach a calendar date to an exchange time-of-day, in epoch milliseconds.
///
/// Deals stamped 20:00-23:59 that arrive during local hour 0 were buffered
/// across midnight and belong to the previous day. Everything else is today.
/// This assumes the local clock shares the exchange's day boundary.
pub fn resolve_trade_time<Tz: TimeZone>(
    now: &DateTime<Tz>,
    hour: u32,
    minute: u32,
    second: u32,
) -> Option<i64> {
    let today = now.date_naive();
    let day = if now.hour() == 0 && (20..=23).contains(&hour) {
        today.pred_opt()?
    } else {
        today
    };

    let local = day.and_hms_opt(hour, minute, second)?;
    now.timezone()
        .from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.timestamp_millis())
}

fn parse_trade_tuple<Tz: TimeZone>(
    tuple: &[Value],
    now: &DateTime<Tz>,
) -> Result<Trade, ExchangeError> {
    let time = tuple
        .get(3)
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("position 3 is not a time string"))?;
    let (hour, minute, second) =
        parse_time_of_day(time).ok_or_else(|| malformed(format!("invalid time of day `{}`", time)))?;
    let date = resolve_trade_time(now, hour, minute, second)
        .ok_or_else(|| malformed(format!("time of day `{}` does not exist locally", time)))?;

    let trade_type = tuple
        .get(4)
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("position 4 is not a side string"))?
        .to_string();

    Ok(Trade {
        tid: i64_at(tuple, 0)?,
        price: f64_at(tuple, 1)?,
        amount: f64_at(tuple, 2)?,
        date,
        trade_type,
    })
}

/// Deals from a stream frame: `[[id, price, amount, "HH:MM:SS", side], ...]`
pub fn parse_trade_tuples<Tz: TimeZone>(
    data: &Value,
    now: &DateTime<Tz>,
) -> Result<Vec<Trade>, ExchangeError> {
    check_error_code(data)?;
    let tuples = as_array(data, "deals frame data")?;
    let mut trades = Vec::with_capacity(tuples.len());

    for tuple in tuples {
        let columns = as_array(tuple, "deal")?;
        match parse_trade_tuple(columns, now) {
            Ok(trade) => trades.push(trade),
            Err(e) => warn!("Skipping deal {}: {}", tuple, e),
        }
    }

    Ok(trades)
}
