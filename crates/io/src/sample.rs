// Built-in placeholder audit, used when nothing usable is stored.

use auditgrid_core::CellValue;

use crate::gateway::FieldMapping;

pub fn placeholder_matrix() -> Vec<Vec<CellValue>> {
    let row = |po: &str, desc: &str, qty: f64, unit: &str, status: &str| {
        vec![
            CellValue::text(po),
            CellValue::text(desc),
            CellValue::Number(qty),
            CellValue::text(unit),
            CellValue::text(status),
        ]
    };

    vec![
        vec![
            CellValue::text("PO Number"),
            CellValue::text("Description"),
            CellValue::text("Quantity"),
            CellValue::text("Unit"),
            CellValue::text("Status"),
        ],
        row("PO-0001", "Lube oil filter", 4.0, "pcs", "Open"),
        row("PO-0002", "Immersion suit", 12.0, "pcs", "Open"),
        row("PO-0001", "Lube oil filter", 4.0, "pcs", "Open"),
        row("PO-0003", "ECDIS chart licence", 1.0, "set", "Closed"),
        row("PO-0004", "Oily water separator spares", 2.0, "kit", "Open"),
        row("PO-0002", "Immersion suit", 10.0, "pcs", "Pending"),
    ]
}

pub fn placeholder_fields() -> FieldMapping {
    FieldMapping::from_iter([
        (0, "po_number"),
        (1, "description"),
        (2, "quantity"),
        (3, "unit"),
        (4, "status"),
    ])
}
