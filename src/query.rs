use crate::models::Quotation;

/// Filters and orders a store snapshot for the listing view.
///
/// `search` keeps records whose id or customer name contains it, and
/// `customer` keeps records whose customer name contains it. Both match
/// case-insensitively, are trimmed first, and are ignored when blank.
/// When both are given they apply together.
///
/// The result is ordered newest `received_at` first. The sort is stable,
/// so records with equal timestamps keep their snapshot order.
pub fn query(snapshot: &[Quotation], search: &str, customer: &str) -> Vec<Quotation> {
    let search = search.trim().to_lowercase();
    let customer = customer.trim().to_lowercase();

    let mut results: Vec<Quotation> = snapshot
        .iter()
        .filter(|quotation| {
            if search.is_empty() {
                return true;
            }
            quotation.id().as_str().to_lowercase().contains(&search)
                || quotation.customer_name().to_lowercase().contains(&search)
        })
        .filter(|quotation| {
            customer.is_empty() || quotation.customer_name().to_lowercase().contains(&customer)
        })
        .cloned()
        .collect();

    results.sort_by(|a, b| b.received_at().cmp(a.received_at()));
    results
}
