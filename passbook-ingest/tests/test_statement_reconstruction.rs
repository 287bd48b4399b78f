use chrono::NaiveDate;
use passbook_core::{format_amount, Transaction};
use passbook_ingest::{
    parse_statement_tables, parse_statement_text, parse_workbook, render_statement, IngestError,
    Sheet, Table, Workbook,
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const STATEMENT: &str = "\
HDFC BANK Ltd.                                                  Page No .: 1
Statement of account
Date Narration Chq./Ref.No. Value Dt Withdrawal Amt. Deposit Amt. Closing Balance
01/04/23 OPENING CREDIT 0000000000000001 01/04/23 10,000.00 0.00 10,000.00
01/04/23 UPI-RAMESH KUMAR-ramesh@okaxis-0000309112345678-FEED 300.00 9,700.00
BILL MARCH
02/04/23 NEFT DR-CNRB0002374-OWN ACCOUNT
TRANSFER 0.00 2,000.00 7,700.00
03/04/23 NEFT CR-SBIN0000583-MRS RASHMI SAXENA N093230123456789 04/04/23 5,000.00 0.00 12,700.00
\x0cPage No .: 2
04/04/23 LOAN EMI 1,234.00 ACCT 0.00 5,000.00 7,700.00
05/04/23 IMPS-506016885554-REKHA MITTAL-SBIN-XXXXXXX4686-MILK PAYMENT 1,500.00 9,200.00
";

#[test]
fn test_salary_line_without_history() {
    let report = parse_statement_text(
        "01/04/23 SALARY TRANSFER TO STAFF 50,000.00 1,00,000.00",
        "salary.txt",
    )
    .unwrap();
    assert_eq!(report.transactions.len(), 1);
    let t = &report.transactions[0];
    assert_eq!(t.date, NaiveDate::from_ymd_opt(2023, 4, 1).unwrap());
    assert_eq!(t.narration, "SALARY TRANSFER TO STAFF");
    assert_eq!(t.withdrawal, dec!(50000.00));
    assert_eq!(t.deposit, Decimal::ZERO);
    assert_eq!(t.closing_balance, dec!(100000.00));
}

#[test]
fn test_full_statement() {
    let report = parse_statement_text(STATEMENT, "april.pdf").unwrap();
    let t = &report.transactions;
    assert_eq!(t.len(), 6);

    assert_eq!(t[0].reference.as_deref(), Some("0000000000000001"));
    assert_eq!(t[0].deposit, dec!(10000.00));

    assert_eq!(
        t[1].narration,
        "UPI-RAMESH KUMAR-ramesh@okaxis-0000309112345678-FEED BILL MARCH"
    );
    assert_eq!(t[1].withdrawal, dec!(300.00));

    assert_eq!(t[2].narration, "NEFT DR-CNRB0002374-OWN ACCOUNT TRANSFER");
    assert_eq!(t[2].withdrawal, dec!(2000.00));

    assert_eq!(t[3].reference.as_deref(), Some("N093230123456789"));
    assert_eq!(t[3].value_date, NaiveDate::from_ymd_opt(2023, 4, 4));

    assert_eq!(t[4].narration, "LOAN EMI 1,234.00 ACCT");
    assert_eq!(t[5].deposit, dec!(1500.00));

    for txn in t {
        assert!(txn.withdrawal.is_zero() || txn.deposit.is_zero(), "{txn:?}");
    }
}

fn assert_render_round_trip(text: &str) {
    let first = parse_statement_text(text, "first").unwrap();
    let rendered = render_statement(&first.transactions);
    let second = parse_statement_text(&rendered, "rendered").unwrap();
    assert_eq!(first.transactions, second.transactions, "{rendered}");
    assert!(second.warnings.is_empty());
}

#[test]
fn test_rendered_statement_parses_back_identically() {
    assert_render_round_trip(STATEMENT);
}

#[test]
fn test_reference_like_narration_tail_survives_rendering() {
    assert_render_round_trip("01/04/23 NEFT CR-SBIN0000583 N093230123456789 0.00 5,000.00 10,000.00");
    assert_render_round_trip("01/04/23 N093230123456789 01/04/23 0.00 5,000.00 10,000.00");
}

#[test]
fn test_table_continuation_is_concatenated_exactly() {
    let tables: Vec<Table> = vec![vec![
        ["01/04/23", "Payment to", "", "", "250.00", "", "750.00"]
            .map(String::from)
            .to_vec(),
        ["", "XYZ corp", "", "", "", "", ""].map(String::from).to_vec(),
    ]];
    let report = parse_statement_tables(&tables, "tables.pdf").unwrap();
    assert_eq!(report.transactions[0].narration, "Payment toXYZ corp");
}

#[test]
fn test_workbook_continuation_is_concatenated_exactly() {
    let rows = vec![
        ["Date", "Narration", "Withdrawal Amt.", "Deposit Amt.", "Closing Balance"]
            .map(String::from)
            .to_vec(),
        ["2023-04-01 00:00:00", "Payment to", "250", "", "750"]
            .map(String::from)
            .to_vec(),
        ["nan", "XYZ corp", "nan", "nan", "nan"].map(String::from).to_vec(),
    ];
    let report = parse_workbook(&Workbook::new(vec![Sheet::new("Sheet1", rows)]), "book.xlsx").unwrap();
    let expected = Transaction::new(
        NaiveDate::from_ymd_opt(2023, 4, 1).unwrap(),
        "Payment toXYZ corp",
        dec!(250),
        Decimal::ZERO,
        dec!(750),
    );
    assert_eq!(report.transactions, vec![expected]);
}

#[test]
fn test_unreadable_source_is_distinct_failure() {
    let err = parse_statement_text("\u{fffd}\u{fffd}\u{fffd}\n", "locked.pdf").unwrap_err();
    assert!(matches!(err, IngestError::NoTransactionsFound { .. }));
}

fn narration_word() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[A-Z][A-Z0-9@-]{0,8}",
        2 => "[A-Z]{1,3}[0-9]{7,16}",
        1 => "0{10,16}",
    ]
}

/// One statement row: day, narration words, wrapped words, trailing columns
/// (0 none, 1 value date, 2 reference and value date), reference, amounts in paise.
fn statement_row() -> impl Strategy<Value = (u32, Vec<String>, Vec<String>, u8, String, Vec<i64>)> {
    (
        1u32..=28,
        prop::collection::vec(narration_word(), 0..5),
        prop::collection::vec(narration_word(), 0..3),
        0u8..3,
        "[A-Z0-9]{6,16}",
        prop::collection::vec(0i64..10_000_000, 2..=3),
    )
}

fn statement_text(rows: &[(u32, Vec<String>, Vec<String>, u8, String, Vec<i64>)]) -> String {
    let mut text = String::new();
    for (day, words, wrapped, columns, reference, amounts) in rows {
        let date = format!("{day:02}/04/23");
        let mut line = date.clone();
        for word in words {
            line.push(' ');
            line.push_str(word);
        }
        match *columns {
            1 => line.push_str(&format!(" {date}")),
            2 => line.push_str(&format!(" {reference} {date}")),
            _ => {}
        }
        for paise in amounts {
            line.push(' ');
            line.push_str(&format_amount(Decimal::new(*paise, 2)));
        }
        text.push_str(&line);
        text.push('\n');
        if !wrapped.is_empty() {
            text.push_str(&wrapped.join(" "));
            text.push('\n');
        }
    }
    text
}

proptest! {
    #[test]
    fn rendered_records_reconstruct_to_themselves(rows in prop::collection::vec(statement_row(), 1..12)) {
        let text = statement_text(&rows);
        let first = match parse_statement_text(&text, "generated") {
            Ok(report) => report,
            // every row had zero amounts
            Err(_) => return Ok(()),
        };
        let rendered = render_statement(&first.transactions);
        let second = parse_statement_text(&rendered, "rendered").unwrap();
        prop_assert_eq!(&first.transactions, &second.transactions);
        prop_assert!(second.warnings.is_empty());
    }

    #[test]
    fn two_amount_lines_take_the_balance_delta(balances in prop::collection::vec(0i64..100_000_000, 2..20)) {
        // Line 0 anchors the running balance; every later line has one amount
        // (deliberately wrong) and the balance.
        let mut text = format!(
            "01/04/23 ANCHOR 0.00 0.00 {}\n",
            format_amount(Decimal::new(balances[0], 2))
        );
        for (i, cents) in balances.iter().enumerate().skip(1) {
            text.push_str(&format!(
                "01/04/23 TXN{i} 1.00 {}\n",
                format_amount(Decimal::new(*cents, 2))
            ));
        }

        let report = match parse_statement_text(&text, "prop") {
            Ok(report) => report,
            // every delta was zero
            Err(_) => return Ok(()),
        };

        for txn in &report.transactions {
            let i: usize = txn.narration.trim_start_matches("TXN").parse().unwrap();
            let delta = (Decimal::new(balances[i], 2) - Decimal::new(balances[i - 1], 2)).abs();
            prop_assert_eq!(txn.withdrawal + txn.deposit, delta);
            prop_assert!(txn.withdrawal.is_zero() || txn.deposit.is_zero());
        }
    }
}
