//! Plain-text rendering of transaction details

use super::details::{ArgumentRow, Recipient, TransactionDetails};

/// A titled list of label/value rows
pub struct DetailTable {
    pub title: String,
    pub rows: Vec<(String, String)>,
}

impl DetailTable {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            rows: Vec::new(),
        }
    }

    pub fn add(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.rows.push((label.into(), value.into()));
        self
    }

    pub fn render(&self) -> String {
        let width = self
            .rows
            .iter()
            .map(|(label, _)| label.len())
            .max()
            .unwrap_or(0);

        let mut out = format!("{}\n", self.title);
        for (label, value) in &self.rows {
            out.push_str(&format!("  {:<width$}  {}\n", format!("{label}:"), value, width = width + 1));
        }
        out
    }
}

impl From<&TransactionDetails> for DetailTable {
    fn from(details: &TransactionDetails) -> Self {
        let to = match &details.to {
            Recipient::Address(address) => address.clone(),
            Recipient::ContractCreation(address) => format!("Contract Creation: {address}"),
            Recipient::Pending => "Contract Creation (pending)".to_string(),
        };
        let block = details
            .block_number
            .map(|n| n.to_string())
            .unwrap_or_else(|| "pending".to_string());

        let mut table = DetailTable::new("Transaction Details")
            .add("Transaction Hash", &details.hash)
            .add("Block Number", block)
            .add("From", &details.from)
            .add("To", to)
            .add("Value", &details.value)
            .add("Function called", details.function.summary());
        if let Some(status) = &details.status {
            table = table.add("Status", status);
        }
        table
            .add("Gas Price", details.gas_price.as_deref().unwrap_or("-"))
            .add("Data", &details.data)
    }
}

/// Render the full view: detail rows followed by the argument table
pub fn render_details(details: &TransactionDetails) -> String {
    let mut out = DetailTable::from(details).render();
    if !details.arguments.is_empty() {
        out.push('\n');
        out.push_str(&render_arguments(&details.arguments));
    }
    out
}

/// Render argument rows as a Name/Type/Value table
pub fn render_arguments(arguments: &[ArgumentRow]) -> String {
    let header = ("Name", "Type", "Value");
    let name_width = arguments
        .iter()
        .map(|arg| arg.name.len())
        .chain([header.0.len()])
        .max()
        .unwrap_or(0);
    let kind_width = arguments
        .iter()
        .map(|arg| arg.kind.len())
        .chain([header.1.len()])
        .max()
        .unwrap_or(0);

    let mut out = String::from("Arguments\n");
    out.push_str(&format!(
        "  {:<name_width$}  {:<kind_width$}  {}\n",
        header.0, header.1, header.2
    ));
    for arg in arguments {
        out.push_str(&format!(
            "  {:<name_width$}  {:<kind_width$}  {}\n",
            arg.name, arg.kind, arg.value
        ));
    }
    out
}
