/// Static search corpora: the site's product and page index, and the news page's
/// posts, tips, categories and sidebar sections. Declaration order is result order.
use serde::Serialize;

use crate::dom::Document;

const HEADER_PADDING: f64 = 20.0;
const DEFAULT_SCROLL_OFFSET: f64 = 100.0;

#[derive(Debug, Serialize)]
pub struct SiteEntry {
    pub title: &'static str,
    pub description: &'static str,
    pub image: &'static str,
    pub url: &'static str,
    pub tags: &'static [&'static str],
}

pub static SITE_PRODUCTS: [SiteEntry; 4] = [
    SiteEntry {
        title: "Mụn Dừa Xử Lý",
        description: "Giá thể sạch, tơi xốp và dễ sử dụng – phù hợp cho trồng lan, bon sai, dâu tây, dưa lưới và nhiều loại cây trồng khác",
        image: "/assets/image/products/mun-dua-xu-ly/1-Nguyên liệu mụn dừa xử lý.jpg",
        url: "/san-pham#processed",
        tags: &["mụn dừa", "xử lý", "sạch", "tơi xốp", "nông nghiệp", "canh tác", "lan", "bon sai", "dua luoi", "dâu tây"],
    },
    SiteEntry {
        title: "Vỏ Dừa Cắt Chip",
        description: "Giá thể trồng cây sạch cho nông nghiệp hiện đại, kích thước 1–3cm hoặc theo yêu cầu. Phủ bề mặt, giữ ẩm, phòng sâu bệnh cho cây trồng",
        image: "/assets/image/products/vo-dua-cat-chip/1-Nguyên liệu vỏ dừa cắt chip.jpg",
        url: "/san-pham#chips",
        tags: &["vỏ dừa", "cắt chip", "chip", "cắt", "vo dua", "giữ ẩm", "phủ bề mặt", "nông nghiệp", "phong sau benh", "trang trí", "cây cảnh"],
    },
    SiteEntry {
        title: "Mụn Dừa Thô",
        description: "Nguyên liệu thô, giá cả phải chăng, phân hủy tự nhiên. Thích hợp cho mô hình trồng trọt quy mô lớn",
        image: "/assets/image/products/mun-dua-tho/1-Nguyên liệu mụn dừa thô.jpg",
        url: "/san-pham#raw",
        tags: &["mụn dừa", "thô", "giá rẻ", "quy mô lớn", "nông nghiệp", "nguyên liệu"],
    },
    SiteEntry {
        title: "Sản Xuất Theo Yêu Cầu",
        description: "Tùy chỉnh sản phẩm mụn dừa theo nhu cầu nông nghiệp của khách hàng. Tỷ lệ trộn mụn/xơ linh hoạt từ 95/5 đến 50/50, kích thước và độ ẩm theo yêu cầu.",
        image: "/assets/image/products/san-xuat-theo-yeu-cau/1-NL sản xuất theo yêu cầu.jpg",
        url: "/san-pham#custom",
        tags: &["tùy chỉnh", "theo yêu cầu", "linh hoạt", "nông nghiệp", "đặt hàng", "mụn dừa", "sản xuất", "tỷ lệ trộn", "custom"],
    },
];

pub static SITE_PAGES: [SiteEntry; 4] = [
    SiteEntry {
        title: "Trang Chủ - Mụn Dừa Hoàng Hiếu",
        description: "Giải pháp nông nghiệp xanh - Đồng hành cùng phát triển bền vững. Từ quê hương xứ dừa Bến Tre, chúng tôi chọn lọc những nguyên liệu tự nhiên để tạo nên các dòng giá thể mụn dừa sạch, tơi xốp và dễ sử dụng.",
        image: "/assets/image/banner/banner1.jpg",
        url: "/",
        tags: &["trang chủ", "nông nghiệp", "xanh", "bền vững", "giải pháp", "môi trường", "phát triển", "tự nhiên", "sạch", "bến tre"],
    },
    SiteEntry {
        title: "Giới Thiệu - Mụn Dừa Hoàng Hiếu",
        description: "Chúng tôi cung cấp sản phẩm mụn dừa chất lượng cao từ Bến Tre, hỗ trợ nông dân phát triển nông nghiệp bền vững. Triết lý: Kinh doanh không chỉ là bán sản phẩm, mà còn là gửi gắm sự chân thành.",
        image: "/assets/image/logo.svg",
        url: "/gioi-thieu",
        tags: &["giới thiệu", "về chúng tôi", "bến tre", "xứ dừa", "chất lượng", "nông nghiệp", "bền vững", "triết lý", "chân thành"],
    },
    SiteEntry {
        title: "Sản Phẩm - Mụn Dừa Hoàng Hiếu",
        description: "Danh mục sản phẩm: Mụn Dừa Xử Lý, Vỏ Dừa Cắt Chip, Mụn Dừa Thô, Sản Xuất Theo Yêu Cầu. Quy trình sản xuất chất lượng cao.",
        image: "/assets/image/products/mun-dua-xu-ly/1-Nguyên liệu mụn dừa xử lý.jpg",
        url: "/san-pham",
        tags: &["sản phẩm", "danh mục", "mụn dừa", "vỏ dừa", "chip", "quy trình", "sản xuất"],
    },
    SiteEntry {
        title: "Liên Hệ - Mụn Dừa Hoàng Hiếu",
        description: "Liên hệ với chúng tôi để được tư vấn miễn phí về sản phẩm mụn dừa phù hợp với nhu cầu canh tác của bạn. Địa chỉ: Ấp Hội An, Xã Đa Phước Hội, Huyện Mỏ Cày Nam, Tỉnh Bến Tre. Hotline: 0984.288.512",
        image: "/assets/image/Footer/Face.png",
        url: "/lien-he",
        tags: &["liên hệ", "tư vấn", "hỗ trợ", "miễn phí", "địa chỉ", "bến tre", "hotline", "điện thoại"],
    },
];

#[derive(Debug, Serialize)]
pub struct NewsPost {
    pub id: u32,
    pub title: &'static str,
    pub category: &'static str,
    pub category_key: &'static str,
    pub date: &'static str,
    pub thumbnail: &'static str,
    pub excerpt: &'static str,
    pub featured: bool,
    pub read_time: &'static str,
    pub tags: &'static [&'static str],
    /// Plain-text body.
    pub content: &'static str,
}

pub static NEWS_POSTS: [NewsPost; 6] = [
    NewsPost {
        id: 1,
        title: "Làm Thế Nào Phân Biệt Mụn Dừa Đã Xử Lý Và Chưa Xử Lý",
        category: "Kỹ Thuật",
        category_key: "techniques",
        date: "19/10/2025",
        thumbnail: "/assets/image/News/1.1-Mun da xu ly.jpg",
        excerpt: "Hướng dẫn chi tiết cách nhận biết mụn dừa đã xử lý và chưa xử lý qua màu sắc, cảm quan và các chỉ số định lượng.",
        featured: true,
        read_time: "5 phút đọc",
        tags: &["Kiến thức", "Phân biệt", "Chất lượng"],
        content: "Phân Biệt Mụn Dừa Xử Lý & Chưa Xử Lý. Mụn đã xử lý: màu sắc NÂU ĐỎ đặc trưng, cảm quan MỀM MỊN, ẨM ƯỚT, ngâm nước có màu NHẠT/TRONG SUỐT. Mụn chưa xử lý: màu sắc VÀNG NHẠT, cảm quan CỨNG, KHÔ RÁO, ngâm nước có màu NÂU SẬM. Kiểm tra định lượng: độ ẩm xử lý 70-80%, chưa xử lý 45-55%; độ dẫn điện xử lý ≤ 0.5, chưa xử lý > 2.5; độ pH xử lý 6-7, chưa xử lý 5.5-6.5. Lưu ý: việc phân biệt đúng loại mụn dừa giúp bạn lựa chọn sản phẩm phù hợp cho từng loại cây trồng, đảm bảo hiệu quả canh tác tốt nhất và tránh gây hại cho cây.",
    },
    NewsPost {
        id: 2,
        title: "Những Tác Dụng Của Xơ Dừa Đối Với Cây Trồng",
        category: "Kinh Nghiệm",
        category_key: "experience",
        date: "18/10/2025",
        thumbnail: "/assets/image/News/2.2-Tac dung cua xo dua.jpg",
        excerpt: "Xơ dừa là vật liệu trồng cây thân thiện môi trường, giúp cây phát triển khỏe mạnh và tiết kiệm nước tưới.",
        featured: true,
        read_time: "4 phút đọc",
        tags: &["Xơ dừa", "Lợi ích", "Cây trồng"],
        content: "Lợi Ích Của Xơ Dừa. Xơ dừa giúp giữ ẩm, thoáng khí và phát triển rễ mạnh mẽ.",
    },
    NewsPost {
        id: 3,
        title: "Lưu Ý Khi Sử Dụng Mụn Dừa Trồng Cây",
        category: "Kỹ Thuật",
        category_key: "techniques",
        date: "17/10/2025",
        thumbnail: "/assets/image/News/3.1-Luu y.jpg",
        excerpt: "Hướng dẫn cách sử dụng mụn dừa đúng cách để đạt hiệu quả tốt nhất cho cây trồng.",
        featured: false,
        read_time: "3 phút đọc",
        tags: &["Hướng dẫn", "Kỹ thuật"],
        content: "Cách Sử Dụng Mụn Dừa. Ngâm nước trước khi sử dụng, trộn với đất hoặc sử dụng riêng.",
    },
    NewsPost {
        id: 4,
        title: "Mụn Dừa Là Gì Và Tại Sao Dùng Trong Trồng Cây",
        category: "Môi Trường",
        category_key: "environment",
        date: "16/10/2025",
        thumbnail: "/assets/image/News/4-1-Mua dua co tac dung gi.jpg",
        excerpt: "Giải thích về nguồn gốc, thành phần và lý do mụn dừa trở thành vật liệu trồng cây phổ biến.",
        featured: false,
        read_time: "6 phút đọc",
        tags: &["Giới thiệu", "Môi trường"],
        content: "Nguồn Gốc Mụn Dừa. Mụn dừa được làm từ lớp xơ giữa vỏ dừa, là phụ phẩm tự nhiên tái chế.",
    },
    NewsPost {
        id: 5,
        title: "Lợi Ích Của Mụn Dừa Cho Cây Trồng Và Môi Trường",
        category: "Môi Trường",
        category_key: "environment",
        date: "15/10/2025",
        thumbnail: "/assets/image/News/5-1-.jpg",
        excerpt: "Tổng hợp những lợi ích vượt trội của mụn dừa so với các loại vật liệu trồng cây truyền thống.",
        featured: false,
        read_time: "5 phút đọc",
        tags: &["Lợi ích", "So sánh"],
        content: "Ưu Điểm Vượt Trội. Mụn dừa bền vững, giảm phát thải CO2 và có thể tái sử dụng nhiều lần.",
    },
    NewsPost {
        id: 6,
        title: "Kinh Nghiệm Chọn Mua Mụn Dừa Chất Lượng",
        category: "Góc Chia Sẻ",
        category_key: "sharing",
        date: "14/10/2025",
        thumbnail: "/assets/image/News/1.1-Mun da xu ly.jpg",
        excerpt: "Bí quyết nhận biết và lựa chọn mụn dừa tốt nhất từ người có kinh nghiệm.",
        featured: false,
        read_time: "4 phút đọc",
        tags: &["Mua sắm", "Kinh nghiệm"],
        content: "Cách Chọn Mụn Dừa Tốt. Chọn mụn có màu đồng đều, không mùi lạ, độ ẩm vừa phải.",
    },
];

#[derive(Debug, Serialize)]
pub struct QuickTip {
    pub icon: &'static str,
    pub title: &'static str,
    pub tip: &'static str,
}

pub static QUICK_TIPS: [QuickTip; 5] = [
    QuickTip { icon: "💧", title: "Giữ ẩm tốt", tip: "Mụn dừa giữ ẩm gấp 8-10 lần đất thường" },
    QuickTip { icon: "🌱", title: "Thoáng khí", tip: "Tạo độ tơi xốp, rễ cây phát triển mạnh" },
    QuickTip { icon: "♻️", title: "Tái sử dụng", tip: "Dùng 18-24 tháng, sau đó làm phân hữu cơ" },
    QuickTip { icon: "💰", title: "Tiết kiệm", tip: "Giảm 40-50% lượng nước tưới" },
    QuickTip { icon: "🌿", title: "pH lý tưởng", tip: "pH 6-7, phù hợp hầu hết cây trồng" },
];

/// One tip per weekday, Monday first.
pub static DAILY_TIPS: [&str; 7] = [
    "Ngâm và xả mụn dừa 2-3 lần trước khi trồng để giảm độ mặn",
    "Trộn mụn dừa với đất theo tỷ lệ 1:1 cho rau ăn lá",
    "Kiểm tra độ ẩm giá thể bằng tay trước mỗi lần tưới",
    "Phủ vỏ dừa cắt chip quanh gốc để hạn chế cỏ dại",
    "Bổ sung phân hữu cơ định kỳ vì mụn dừa nghèo dinh dưỡng",
    "Giữ giá thể thoáng, tránh tưới ngập làm úng rễ",
    "Tái sử dụng mụn dừa cũ làm lớp lót đáy chậu",
];

#[derive(Debug, Serialize)]
pub struct Category {
    pub key: &'static str,
    pub label: &'static str,
}

pub static CATEGORIES: [Category; 5] = [
    Category { key: "knowledge", label: "Kiến Thức Cơ Bản" },
    Category { key: "techniques", label: "Kỹ Thuật Canh Tác" },
    Category { key: "experience", label: "Kinh Nghiệm Nông Dân" },
    Category { key: "benefits", label: "Lợi Ích & Môi Trường" },
    Category { key: "other", label: "Khác" },
];

/// A sidebar block on the news page that search can scroll to.
#[derive(Debug, Serialize)]
pub struct SectionAnchor {
    pub title: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub keywords: &'static [&'static str],
    /// Tried in order; the first element present is the scroll target.
    pub selectors: &'static [&'static str],
}

impl SectionAnchor {
    /// Scroll offset that brings the section just below the page header, computed
    /// from the document as it is now. `None` when no target element exists.
    pub fn scroll_position(&self, doc: &Document) -> Option<f64> {
        let target = self.selectors.iter().find_map(|s| doc.query(s))?;
        let header_offset = doc
            .header()
            .map(|h| h.height + HEADER_PADDING)
            .unwrap_or(DEFAULT_SCROLL_OFFSET);
        Some(target.top - header_offset)
    }
}

pub static SECTION_ANCHORS: [SectionAnchor; 5] = [
    SectionAnchor {
        title: "Mẹo Canh Tác",
        icon: "💡",
        description: "Những mẹo hữu ích cho nông dân",
        keywords: &["mẹo", "canh", "tác", "tips", "hữu ích"],
        selectors: &["#tip-sidebar", ".tip-card"],
    },
    SectionAnchor {
        title: "Góc Chia Sẻ",
        icon: "📸",
        description: "Hình ảnh kết quả từ khách hàng",
        keywords: &["góc", "chia", "sẻ", "hình", "ảnh", "gallery", "kết quả"],
        selectors: &[".results-title", ".results-card"],
    },
    SectionAnchor {
        title: "Bài Viết Liên Quan",
        icon: "📰",
        description: "Các bài viết cùng chủ đề",
        keywords: &["bài", "viết", "liên", "quan", "related"],
        selectors: &[".related-title", ".related-card"],
    },
    SectionAnchor {
        title: "Liên Hệ Nhanh",
        icon: "📞",
        description: "Chat Zalo hoặc gọi điện",
        keywords: &["liên", "hệ", "contact", "zalo", "chat", "gọi", "điện", "phone"],
        selectors: &[".contact-title", ".contact-card"],
    },
    SectionAnchor {
        title: "Quy Trình Sản Xuất",
        icon: "🎬",
        description: "Video quy trình chế biến mụn dừa",
        keywords: &["quy", "trình", "sản", "xuất", "video", "chế", "biến"],
        selectors: &[".process-title", ".process-card"],
    },
];
