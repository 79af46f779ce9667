use once_cell::sync::Lazy;
use serde::Serialize;

pub type ArticleId = u32;

#[derive(Debug, Clone, Serialize)]
pub struct Article {
    pub id: ArticleId,
    pub category: &'static str,
    pub date: &'static str,
    pub title: &'static str,
    pub excerpt: &'static str,
    pub image: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub title: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub description: &'static str,
    /// Accent colour token used by the project's showcase tile.
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Stat {
    pub icon: &'static str,
    pub label: &'static str,
    pub value: &'static str,
}

/// A navigation entry that scrolls to a named section of the page.
#[derive(Debug, Clone, Serialize)]
pub struct NavSection {
    pub label: &'static str,
    pub anchor: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SocialLink {
    pub network: &'static str,
    pub url: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Hero {
    pub eyebrow: &'static str,
    pub headline: &'static str,
    pub highlight: &'static str,
    pub headline_tail: &'static str,
    pub intro: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SiteProfile {
    pub brand: &'static str,
    pub owner: &'static str,
    pub hero: Hero,
    pub stats: Vec<Stat>,
    pub navigation: Vec<NavSection>,
    pub socials: Vec<SocialLink>,
    pub copyright: &'static str,
}

/// Opening line of every chat transcript.
pub const CHAT_GREETING: &str =
    "你好，我是 Zeyu 的数字替身。关于设计系统、React 开发或极简主义，你想聊点什么？";

/// Persona sent as the system instruction on every chat call.
pub const CHAT_PERSONA: &str = "你是一个叫 Zeyu 的 Design Engineer (设计工程师) 的数字替身。
你运行在一个极简主义风格的个人博客上。

你的角色设定：
1. 专业且富有哲理：你的回答应该简洁、优雅，不仅关注技术细节，也关注设计背后的思考。
2. 技术栈：你精通 React, Tailwind CSS, UI/UX 设计。
3. 风格：语气平和、自信，带有一点点极客的幽默感。
4. 限制：只回答与技术、设计、职业发展或本博客相关的问题。

当前博客内容背景：
- Zeyu 关注极简主义设计、Server Components、数字游民生活。
- Zeyu 有开源项目 \"Aurora UI\" 和 AI 工具 \"ZenTask\"。

请用中文回答。保持回答精炼，不要长篇大论，像是在对话。";

static ARTICLES: Lazy<Vec<Article>> = Lazy::new(|| {
    vec![
        Article {
            id: 1,
            category: "设计思维",
            date: "2023年 10月 24日",
            title: "极简主义不是空无一物，而是恰如其分",
            excerpt: "在数字产品的设计中，我们往往陷入堆砌功能的陷阱。本文探讨如何通过减法设计，提升用户的核心体验与情感连接。",
            image: "https://images.unsplash.com/photo-1494438639946-1ebd1d20bf85?auto=format&fit=crop&q=80&w=800",
        },
        Article {
            id: 2,
            category: "技术前沿",
            date: "2023年 11月 02日",
            title: "构建未来的组件库：React Server Components 实践",
            excerpt: "服务端组件正在改变我们构建前端应用的方式。从性能优化到开发体验，这是一场静悄悄的革命。",
            image: "https://images.unsplash.com/photo-1633356122544-f134324a6cee?auto=format&fit=crop&q=80&w=800",
        },
        Article {
            id: 3,
            category: "生活方式",
            date: "2023年 12月 15日",
            title: "数字游民的背包：在旅途中寻找代码与诗意",
            excerpt: "清迈的咖啡馆，巴厘岛的海滩。作为一名远程开发者，我在地理位置的流动中寻找创造力的恒定。",
            image: "https://images.unsplash.com/photo-1522202176988-66273c2fd55f?auto=format&fit=crop&q=80&w=800",
        },
    ]
});

static PROJECTS: Lazy<Vec<Project>> = Lazy::new(|| {
    vec![
        Project {
            title: "Aurora UI",
            kind: "开源设计系统",
            description: "一套基于 Tailwind 的现代化 React 组件库，专注于可访问性。",
            color: "purple",
        },
        Project {
            title: "ZenTask",
            kind: "生产力工具",
            description: "利用 AI 辅助的任务管理应用，帮助创意工作者进入心流状态。",
            color: "emerald",
        },
        Project {
            title: "MonoFont",
            kind: "字体设计",
            description: "一款专为编程设计的等宽字体，平衡了阅读舒适度与代码美学。",
            color: "orange",
        },
    ]
});

static PROFILE: Lazy<SiteProfile> = Lazy::new(|| SiteProfile {
    brand: "ZEYU.DESIGN",
    owner: "Zeyu",
    hero: Hero {
        eyebrow: "Design Engineer",
        headline: "在混乱中",
        highlight: "构建秩序",
        headline_tail: "与美感。",
        intro: "你好，我是 Zeyu。一名游走于设计与代码之间的开发者。我热衷于创造直观的数字体验，并用文字记录技术背后的思考。",
    },
    stats: vec![
        Stat { icon: "code", label: "代码提交", value: "2,048+" },
        Stat { icon: "pen-tool", label: "设计稿", value: "150+" },
        Stat { icon: "coffee", label: "咖啡", value: "∞" },
        Stat { icon: "mail", label: "订阅者", value: "5K+" },
    ],
    navigation: vec![
        NavSection { label: "文章", anchor: "articles" },
        NavSection { label: "项目", anchor: "projects" },
        NavSection { label: "关于", anchor: "about" },
        NavSection { label: "联系", anchor: "contact" },
    ],
    socials: vec![
        SocialLink { network: "github", url: "#" },
        SocialLink { network: "twitter", url: "#" },
        SocialLink { network: "linkedin", url: "#" },
        SocialLink { network: "mail", url: "#" },
    ],
    copyright: "© 2024 Zeyu Design. All rights reserved.",
});

pub fn articles() -> &'static [Article] {
    &ARTICLES
}

pub fn find_article(id: ArticleId) -> Option<&'static Article> {
    ARTICLES.iter().find(|article| article.id == id)
}

pub fn projects() -> &'static [Project] {
    &PROJECTS
}

pub fn profile() -> &'static SiteProfile {
    &PROFILE
}
