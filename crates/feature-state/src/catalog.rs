//! Static job listings and learning resources.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobListing {
    pub id: &'static str,
    pub title: &'static str,
    pub company: &'static str,
    pub location: &'static str,
    pub url: &'static str,
    pub description: &'static str,
    pub category: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LearningResource {
    pub id: &'static str,
    pub title: &'static str,
    pub platform: &'static str,
    pub url: &'static str,
    pub description: &'static str,
    pub category: &'static str,
}

const JOBS: &[JobListing] = &[
    JobListing {
        id: "1",
        title: "AI Ethics Specialist",
        company: "FutureTech Inc.",
        location: "Remote",
        url: "#",
        description: "Develop and implement ethical guidelines for AI products. Strong background in ethics and AI required.",
        category: "AI & Ethics",
    },
    JobListing {
        id: "2",
        title: "Senior UX Researcher",
        company: "Innovate Solutions",
        location: "New York, NY",
        url: "#",
        description: "Lead user research initiatives to inform product design and strategy for cutting-edge tech products.",
        category: "UX & Design",
    },
    JobListing {
        id: "3",
        title: "Blockchain Developer",
        company: "CryptoChain Ltd.",
        location: "Austin, TX (Hybrid)",
        url: "#",
        description: "Design, implement, and support blockchain-based applications and smart contracts.",
        category: "Web3",
    },
    JobListing {
        id: "4",
        title: "Renewable Energy Analyst",
        company: "GreenPower Co.",
        location: "San Francisco, CA",
        url: "#",
        description: "Analyze market trends and policy changes in the renewable energy sector to guide investment decisions.",
        category: "Sustainability",
    },
    JobListing {
        id: "5",
        title: "Cloud Solutions Architect",
        company: "SkyHigh Cloud Services",
        location: "Remote",
        url: "#",
        description: "Design and deploy scalable, secure, and robust cloud solutions for enterprise clients.",
        category: "Cloud Computing",
    },
    JobListing {
        id: "6",
        title: "Cybersecurity Engineer",
        company: "SecureNet Systems",
        location: "Washington D.C.",
        url: "#",
        description: "Protect company assets by identifying and mitigating security vulnerabilities.",
        category: "Cybersecurity",
    },
];

const COURSES: &[LearningResource] = &[
    LearningResource {
        id: "1",
        title: "Advanced AI for Business Leaders",
        platform: "Coursera",
        url: "https://www.coursera.org/learn/ai-for-everyone",
        description: "Understand AI's impact and learn to implement AI strategies in your business.",
        category: "AI & Business",
    },
    LearningResource {
        id: "2",
        title: "Full-Stack Web Development Bootcamp",
        platform: "Udemy",
        url: "https://www.udemy.com/course/the-complete-web-development-bootcamp/",
        description: "Master front-end and back-end technologies to build complete web applications.",
        category: "Web Development",
    },
    LearningResource {
        id: "3",
        title: "Digital Marketing Specialization",
        platform: "edX",
        url: "https://www.edx.org/masters/micromasters/columbiax-digital-marketing",
        description: "Learn SEO, content marketing, social media, and analytics to grow online presence.",
        category: "Marketing",
    },
    LearningResource {
        id: "4",
        title: "Financial Markets and Investment Strategy",
        platform: "Khan Academy",
        url: "https://www.khanacademy.org/economics-finance-domain/core-finance",
        description: "Explore stocks, bonds, and other investment vehicles with expert guidance.",
        category: "Finance",
    },
    LearningResource {
        id: "5",
        title: "Data Science with Python",
        platform: "DataCamp",
        url: "https://www.datacamp.com/tracks/data-scientist-with-python",
        description: "Unlock insights from data using Python, Pandas, NumPy, and Scikit-learn.",
        category: "Data Science",
    },
    LearningResource {
        id: "6",
        title: "Project Management Professional (PMP) Prep",
        platform: "LinkedIn Learning",
        url: "https://www.linkedin.com/learning/paths/prepare-for-the-pmp-certification-exam",
        description: "Prepare for the PMP certification and master project management principles.",
        category: "Project Management",
    },
];

/// Read-only access to the listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Catalog;

impl Catalog {
    pub fn jobs(&self) -> &'static [JobListing] {
        JOBS
    }

    pub fn courses(&self) -> &'static [LearningResource] {
        COURSES
    }

    /// Jobs in `category`, compared case-insensitively.
    pub fn jobs_in(&self, category: &str) -> Vec<&'static JobListing> {
        JOBS.iter()
            .filter(|job| job.category.eq_ignore_ascii_case(category.trim()))
            .collect()
    }

    /// Courses in `category`, compared case-insensitively.
    pub fn courses_in(&self, category: &str) -> Vec<&'static LearningResource> {
        COURSES
            .iter()
            .filter(|course| course.category.eq_ignore_ascii_case(category.trim()))
            .collect()
    }

    pub fn job_categories(&self) -> Vec<&'static str> {
        distinct(JOBS.iter().map(|job| job.category))
    }

    pub fn course_categories(&self) -> Vec<&'static str> {
        distinct(COURSES.iter().map(|course| course.category))
    }
}

/// First-seen order.
fn distinct(categories: impl Iterator<Item = &'static str>) -> Vec<&'static str> {
    let mut seen = Vec::new();
    for category in categories {
        if !seen.contains(&category) {
            seen.push(category);
        }
    }
    seen
}
