/// Page window resolved from untrusted `page` / `perPage` query values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub per_page: u32,
    pub offset: u64,
}

pub const MAX_PER_PAGE: u32 = 100;

impl Page {
    /// `page` is 1-based and clamped into `u32`; `per_page` into `1..=MAX_PER_PAGE`.
    /// The offset is computed in `u64`, which cannot overflow for those bounds.
    pub fn resolve(page: Option<u64>, per_page: Option<u64>, default_per_page: u32) -> Self {
        let page = page.unwrap_or(1).clamp(1, u32::MAX as u64) as u32;
        let per_page = per_page
            .unwrap_or(default_per_page as u64)
            .clamp(1, MAX_PER_PAGE as u64) as u32;
        let offset = (page as u64 - 1) * per_page as u64;

        Page {
            page,
            per_page,
            offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page() {
        assert_eq!(
            Page::resolve(None, None, 20),
            Page {
                page: 1,
                per_page: 20,
                offset: 0
            }
        );
        assert_eq!(Page::resolve(Some(0), Some(0), 20).offset, 0);
        assert_eq!(Page::resolve(Some(3), Some(10), 20).offset, 20);
    }

    #[test]
    fn huge_page_is_clamped_without_overflow() {
        let page = Page::resolve(Some(u64::MAX), Some(u64::MAX), 10);
        assert_eq!(page.page, u32::MAX);
        assert_eq!(page.per_page, MAX_PER_PAGE);
        assert_eq!(page.offset, (u32::MAX as u64 - 1) * MAX_PER_PAGE as u64);

        let page = Page::resolve(Some(u32::MAX as u64), Some(10), 10);
        assert_eq!(page.offset, (u32::MAX as u64 - 1) * 10);
    }
}
