/// An allow-listed table and the name it is cited under.
#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    pub name: &'static str,
    pub citation: &'static str,
}

pub const ALLOWED_TABLES: &[TableSpec] = &[
    TableSpec { name: "orders", citation: "Orders" },
    TableSpec { name: "order_items", citation: "Order Details" },
    TableSpec { name: "products", citation: "Products" },
    TableSpec { name: "customers", citation: "Customers" },
];

/// Citation names for every allow-listed table whose name occurs in `sql`,
/// case-insensitively, in allow-list order.
pub fn cite_tables(sql: &str) -> Vec<String> {
    let lowered = sql.to_lowercase();
    ALLOWED_TABLES
        .iter()
        .filter(|t| lowered.contains(t.name))
        .map(|t| t.citation.to_string())
        .collect()
}
